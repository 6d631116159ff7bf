//! Database repositories.

pub mod comment;
pub mod credit;
pub mod friendship;
pub mod metadata;
pub mod playlist;
pub mod podcast;
pub mod reaction;
pub mod taxonomy;
pub mod title;
pub mod user;
pub mod video;
pub mod video_detail;

pub use comment::CommentRepository;
pub use credit::{CastCreditRepository, PersonnelRepository, ProduceCreditRepository};
pub use friendship::FriendshipRepository;
pub use metadata::{LanguageRepository, RegionRepository};
pub use playlist::{PlaylistEntryRepository, PlaylistRepository};
pub use podcast::PodcastRepository;
pub use reaction::ReactionRepository;
pub use taxonomy::{
    CategoryRepository, ContentCategoryRepository, ContentHashtagRepository, HashtagRepository,
    TagRepository, VideoTagRepository,
};
pub use title::ContentTitleRepository;
pub use user::UserRepository;
pub use video::VideoRepository;
pub use video_detail::{
    ChannelDetailRepository, ThumbnailDetailRepository, VideoLocalizationRepository,
};

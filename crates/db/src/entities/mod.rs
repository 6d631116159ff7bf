//! Database entities.

#![allow(missing_docs)]

pub mod cast_credit;
pub mod category;
pub mod channel_detail;
pub mod comment;
pub mod content_category;
pub mod content_hashtag;
pub mod content_title;
pub mod friendship;
pub mod hashtag;
pub mod language;
pub mod personnel;
pub mod playlist;
pub mod playlist_entry;
pub mod podcast;
pub mod produce_credit;
pub mod reaction;
pub mod region;
pub mod tag;
pub mod thumbnail_detail;
pub mod user;
pub mod video;
pub mod video_localization;
pub mod video_tag;

pub use cast_credit::Entity as CastCredit;
pub use category::Entity as Category;
pub use channel_detail::Entity as ChannelDetail;
pub use comment::Entity as Comment;
pub use content_category::Entity as ContentCategory;
pub use content_hashtag::Entity as ContentHashtag;
pub use content_title::Entity as ContentTitle;
pub use friendship::Entity as Friendship;
pub use hashtag::Entity as Hashtag;
pub use language::Entity as Language;
pub use personnel::Entity as Personnel;
pub use playlist::Entity as Playlist;
pub use playlist_entry::Entity as PlaylistEntry;
pub use podcast::Entity as Podcast;
pub use produce_credit::Entity as ProduceCredit;
pub use reaction::Entity as Reaction;
pub use region::Entity as Region;
pub use tag::Entity as Tag;
pub use thumbnail_detail::Entity as ThumbnailDetail;
pub use user::Entity as User;
pub use video::Entity as Video;
pub use video_localization::Entity as VideoLocalization;
pub use video_tag::Entity as VideoTag;

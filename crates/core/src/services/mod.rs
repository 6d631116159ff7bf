//! Business logic services.

#![allow(missing_docs)]

pub mod association;
pub mod catalog;
pub mod comment;
pub mod content_registry;
pub mod friendship;
pub mod playlist;
pub mod reaction;
pub mod taxonomy;
pub mod user;

pub use association::{AssociationService, CascadeReport};
pub use catalog::{
    AddCastInput, AddProduceInput, AddThumbnailInput, AddTitleInput, CatalogService,
    ContentMetadataInput, CreatePersonnelInput, CreatePodcastInput, CreateVideoInput, Credits,
    NamedEntryInput, SetChannelInput, SetLocalizationInput,
};
pub use comment::{CommentService, CreateCommentInput, UpdateCommentInput};
pub use content_registry::ContentRegistry;
pub use friendship::{FriendshipListing, FriendshipService, SendFriendRequestInput};
pub use playlist::{
    CreatePlaylistInput, PlaylistService, ResolvedEntry, UpdatePlaylistInput,
};
pub use reaction::{ReactionService, ReactionTally};
pub use taxonomy::{TaxonomyService, normalize_label};
pub use user::{CreateUserInput, CreatedUser, ProfileUpdate, UpdateProfileInput, UserService};

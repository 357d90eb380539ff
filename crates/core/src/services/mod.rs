//! Business logic services.

#![allow(missing_docs)]

pub mod geolocation;
pub mod map;
pub mod report;
pub mod session;
pub mod translation;
pub mod vote;

pub use geolocation::{GeolocationService, IpLookupLocator, Locator, Position, Resolved};
pub use map::{
    MapService, MapView, Marker, category_icon, urgency_color, FOCUS_ZOOM, LOCATED_ZOOM,
};
pub use report::{
    MediaItem, MediaKind, ReportFilter, ReportService, SubmitReportInput, DESCRIPTION_MAX_CHARS,
    DESCRIPTION_MIN_CHARS, MAX_PHOTOS, MAX_VIDEO_SECONDS,
};
pub use session::SessionRegistry;
pub use translation::{
    SupportedLanguage, TranslateInput, TranslationConfig, TranslationProvider, TranslationService,
    TranslationsResponse,
};
pub use vote::{VoteDelta, VoteDirection, VoteOutcome, VoteService, VoteTally};

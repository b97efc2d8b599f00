pub(crate) mod auth;
pub(crate) mod buddymatches;
pub(crate) mod images;
pub(crate) mod reviews;
pub(crate) mod users;

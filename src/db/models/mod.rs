mod admin_user;
mod sponsor;

pub use admin_user::AdminUser;
pub use sponsor::{Sponsor, SponsorInput};

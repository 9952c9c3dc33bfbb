mod admin;
mod listings;
mod login;
mod profile;
mod register;

pub use admin::admin;
pub use listings::listings;
pub use login::login;
pub use profile::profile;
pub use register::register;

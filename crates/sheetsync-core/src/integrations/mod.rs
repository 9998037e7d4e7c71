//! Remote document sources and the credentials they need.

pub mod google;
pub mod oauth;
pub mod service_account;
pub mod traits;

pub use google::GoogleDocs;
pub use oauth::{GoogleAuth, OAuthConfig, OAuthTokens};
pub use service_account::{ServiceAccountAuth, ServiceAccountKey};
pub use traits::DocumentClient;

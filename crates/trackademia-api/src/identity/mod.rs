// Identity provider client (Identity Toolkit v1 dialect).
//
// Base path: {identity_url}/v1/
// Auth: project API key as `?key=`; profile updates also carry the user's ID token

pub mod client;
pub mod models;

pub use client::IdentityClient;
pub use models::IdentityTokens;

// trackademia-api: Async Rust clients for the hosted services behind Trackademia
//
// Three surfaces, each with its own client:
// - `store`: Firestore-style REST document store (typed field values, structured queries)
// - `identity`: email/password identity provider (sign-up, sign-in, profile update)
// - `upload`: unsigned image uploads to a Cloudinary-style media host

pub mod error;
pub mod identity;
pub mod store;
pub mod transport;
pub mod upload;

pub use error::{Error, Rejection};
pub use identity::{IdentityClient, IdentityTokens};
pub use store::{
    ArrayValue, Direction, Document, DocumentClient, FieldFilter, Fields, MapValue, Order, Query,
    Value,
};
pub use transport::{TlsMode, TransportConfig};
pub use upload::{ImageFile, MAX_UPLOAD_BYTES, SUPPORTED_IMAGE_TYPES, UploadClient};

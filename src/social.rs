//! What users can do: register, log in, post, follow each other and read streams.
//! Every operation takes the datastore and the acting `User` explicitly.
pub mod credentials;
pub mod feed;
pub mod graph;
pub mod posts;

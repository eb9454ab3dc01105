//! `tenderhub-bids`: bid records and their pure state changes.

pub mod bid;

pub use bid::{AuthorType, Bid, BidAuthor, BidChange, BidPatch, NewBid};

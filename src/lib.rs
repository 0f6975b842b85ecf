//! `fog-wire`: a binary value-tree codec with adaptive size classes,
//! typed-array zero-copy views, and cross-runtime integer interop.
//!
//! The data model is [`Value`] (owned) and [`ValueRef`] (borrowing, produced
//! by zero-copy decode). [`Encoder`]/[`Decoder`] do the work; [`pack`]/
//! [`unpack`] are one-shot convenience wrappers around them. [`Config`]
//! controls every cap, policy knob, and interop mode.
#![allow(dead_code)]

mod bigint;
mod config;
mod datetime;
mod decoder;
mod depth_tracking;
mod encoder;
mod error;
mod integer;
mod marker;
mod model;
mod numeric;
mod typed_array;
mod uri;
mod value;
mod value_ref;

pub use bigint::BigInteger;
pub use config::Config;
pub use datetime::{DateTime, Duration};
pub use decoder::{unpack, Decoder};
pub use encoder::{pack, Encoder};
pub use error::{Detail, Error, Kind, Result};
pub use integer::Integer;
pub use model::{decode_model, encode_model, FromModel, ToModel};
pub use numeric::{IntInteropMode, NumericRuntime};
pub use typed_array::{BoolBitList, TypedArray, TypedArrayRef};
pub use uri::Uri;
pub use value::Value;
pub use value_ref::ValueRef;

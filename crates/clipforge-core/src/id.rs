//! Opaque identifiers for media assets and timeline clips.
//!
//! Both are random UUID v4 values. New ids only come from `new()`; anything
//! rebuilt from external data must be checked for duplicates by its owner
//! (see `TimelineModel::from_clips`).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Short form is enough for logs and dialogs
                let simple = self.0.simple().to_string();
                f.write_str(&simple[..8])
            }
        }
    };
}

opaque_id!(
    /// Identifier of an imported media asset.
    MediaId
);

opaque_id!(
    /// Identifier of a clip placed on the timeline.
    ClipId
);

//! Opaque handles to resources owned by external collaborators.
//!
//! The engine never looks inside a handle; it only passes them back to the
//! service that issued them.

use serde::{Deserialize, Serialize};

macro_rules! handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Returns the raw value issued by the owning service.
            #[inline]
            #[must_use]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// Handle to a texture loaded by the renderer.
    TextureHandle
);
handle!(
    /// Handle to a font loaded by the renderer.
    FontHandle
);
handle!(
    /// Handle to a sound effect or music track loaded by the audio device.
    SoundHandle
);
handle!(
    /// Handle to a mixer channel returned when a sound starts playing.
    ChannelHandle
);

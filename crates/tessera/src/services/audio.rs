//! # Audio Boundary
//!
//! Sound effects play on mixer channels, music on a single stream. The
//! engine asks by asset name through [`AudioManager`]; the device only ever
//! sees handles.

use tessera_shared::{ChannelHandle, SoundHandle};
use tracing::debug;

use super::assets::AssetStore;
use crate::error::AssetError;

/// Mixer backend.
pub trait AudioDevice {
    /// Starts a sound effect, repeating it `loops` extra times (`-1`
    /// forever).
    ///
    /// # Returns
    ///
    /// The channel it plays on, or `None` when no channel is free.
    fn play(&mut self, sound: SoundHandle, loops: i32) -> Option<ChannelHandle>;

    /// Stops a channel immediately.
    fn stop(&mut self, channel: ChannelHandle);

    /// Fades a channel out over `ms` milliseconds.
    fn fade_out(&mut self, channel: ChannelHandle, ms: u32);

    /// Pauses a channel.
    fn pause(&mut self, channel: ChannelHandle);

    /// Resumes a paused channel.
    fn resume(&mut self, channel: ChannelHandle);

    /// Starts a music track, replacing the current one.
    fn play_music(&mut self, music: SoundHandle, loops: i32);

    /// Stops the music.
    fn stop_music(&mut self);

    /// Fades the music out over `ms` milliseconds.
    fn fade_out_music(&mut self, ms: u32);

    /// Pauses the music.
    fn pause_music(&mut self);

    /// Resumes the music.
    fn resume_music(&mut self);
}

/// What a [`NullAudio`] was asked to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCommand {
    /// [`AudioDevice::play`]
    Play {
        /// Sound started.
        sound: SoundHandle,
        /// Channel assigned.
        channel: ChannelHandle,
        /// Extra repetitions.
        loops: i32,
    },
    /// [`AudioDevice::stop`]
    Stop(ChannelHandle),
    /// [`AudioDevice::fade_out`]
    FadeOut(ChannelHandle, u32),
    /// [`AudioDevice::pause`]
    Pause(ChannelHandle),
    /// [`AudioDevice::resume`]
    Resume(ChannelHandle),
    /// [`AudioDevice::play_music`]
    PlayMusic(SoundHandle, i32),
    /// [`AudioDevice::stop_music`]
    StopMusic,
    /// [`AudioDevice::fade_out_music`]
    FadeOutMusic(u32),
    /// [`AudioDevice::pause_music`]
    PauseMusic,
    /// [`AudioDevice::resume_music`]
    ResumeMusic,
}

/// Silent device that records its commands. Channels are handed out
/// round-robin.
#[derive(Debug)]
pub struct NullAudio {
    channels: u32,
    next_channel: u32,
    log: Vec<AudioCommand>,
}

impl NullAudio {
    /// Device with `channels` mixer channels; zero means no sound effect
    /// ever gets a channel.
    #[must_use]
    pub fn new(channels: u32) -> Self {
        Self {
            channels,
            next_channel: 0,
            log: Vec::new(),
        }
    }

    /// Commands received so far.
    #[must_use]
    pub fn log(&self) -> &[AudioCommand] {
        &self.log
    }
}

impl Default for NullAudio {
    fn default() -> Self {
        Self::new(16)
    }
}

impl AudioDevice for NullAudio {
    fn play(&mut self, sound: SoundHandle, loops: i32) -> Option<ChannelHandle> {
        if self.channels == 0 {
            return None;
        }
        let channel = ChannelHandle(self.next_channel);
        self.next_channel = (self.next_channel + 1) % self.channels;
        self.log.push(AudioCommand::Play {
            sound,
            channel,
            loops,
        });
        Some(channel)
    }

    fn stop(&mut self, channel: ChannelHandle) {
        self.log.push(AudioCommand::Stop(channel));
    }

    fn fade_out(&mut self, channel: ChannelHandle, ms: u32) {
        self.log.push(AudioCommand::FadeOut(channel, ms));
    }

    fn pause(&mut self, channel: ChannelHandle) {
        self.log.push(AudioCommand::Pause(channel));
    }

    fn resume(&mut self, channel: ChannelHandle) {
        self.log.push(AudioCommand::Resume(channel));
    }

    fn play_music(&mut self, music: SoundHandle, loops: i32) {
        self.log.push(AudioCommand::PlayMusic(music, loops));
    }

    fn stop_music(&mut self) {
        self.log.push(AudioCommand::StopMusic);
    }

    fn fade_out_music(&mut self, ms: u32) {
        self.log.push(AudioCommand::FadeOutMusic(ms));
    }

    fn pause_music(&mut self) {
        self.log.push(AudioCommand::PauseMusic);
    }

    fn resume_music(&mut self) {
        self.log.push(AudioCommand::ResumeMusic);
    }
}

/// Plays sounds by asset name.
#[derive(Debug)]
pub struct AudioManager<D: AudioDevice> {
    device: D,
}

impl<D: AudioDevice> AudioManager<D> {
    /// Wraps a device.
    pub const fn new(device: D) -> Self {
        Self { device }
    }

    /// The underlying device.
    pub const fn device(&self) -> &D {
        &self.device
    }

    /// Plays the sound registered as `name`.
    ///
    /// # Errors
    ///
    /// [`AssetError::MissingSound`] for unknown names.
    pub fn play_sound(
        &mut self,
        assets: &AssetStore,
        name: &str,
        loops: i32,
    ) -> Result<Option<ChannelHandle>, AssetError> {
        let sound = assets.sound(name)?;
        let channel = self.device.play(sound, loops);
        if channel.is_none() {
            debug!(name, "no free channel, sound skipped");
        }
        Ok(channel)
    }

    /// Plays the music track registered as `name`.
    ///
    /// # Errors
    ///
    /// [`AssetError::MissingSound`] for unknown names.
    pub fn play_music(&mut self, assets: &AssetStore, name: &str, loops: i32) -> Result<(), AssetError> {
        let music = assets.sound(name)?;
        self.device.play_music(music, loops);
        Ok(())
    }

    /// Stops a channel.
    pub fn stop(&mut self, channel: ChannelHandle) {
        self.device.stop(channel);
    }

    /// Fades a channel out.
    pub fn fade_out(&mut self, channel: ChannelHandle, ms: u32) {
        self.device.fade_out(channel, ms);
    }

    /// Pauses a channel.
    pub fn pause(&mut self, channel: ChannelHandle) {
        self.device.pause(channel);
    }

    /// Resumes a channel.
    pub fn resume(&mut self, channel: ChannelHandle) {
        self.device.resume(channel);
    }

    /// Stops the music.
    pub fn stop_music(&mut self) {
        self.device.stop_music();
    }

    /// Fades the music out.
    pub fn fade_out_music(&mut self, ms: u32) {
        self.device.fade_out_music(ms);
    }

    /// Pauses the music.
    pub fn pause_music(&mut self) {
        self.device.pause_music();
    }

    /// Resumes the music.
    pub fn resume_music(&mut self) {
        self.device.resume_music();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> AssetStore {
        let mut assets = AssetStore::new();
        assets.add_sound("shot", SoundHandle(4));
        assets.add_sound("theme", SoundHandle(9));
        assets
    }

    #[test]
    fn test_play_by_name() {
        let assets = store();
        let mut audio = AudioManager::new(NullAudio::new(2));

        let a = audio.play_sound(&assets, "shot", 0).unwrap();
        let b = audio.play_sound(&assets, "shot", 0).unwrap();
        let c = audio.play_sound(&assets, "shot", 0).unwrap();
        assert_eq!(a, Some(ChannelHandle(0)));
        assert_eq!(b, Some(ChannelHandle(1)));
        assert_eq!(c, Some(ChannelHandle(0)));

        audio.fade_out(ChannelHandle(1), 250);
        audio.play_music(&assets, "theme", -1).unwrap();
        audio.pause_music();

        let log = audio.device().log();
        assert_eq!(log[3], AudioCommand::FadeOut(ChannelHandle(1), 250));
        assert_eq!(log[4], AudioCommand::PlayMusic(SoundHandle(9), -1));
        assert_eq!(log[5], AudioCommand::PauseMusic);
    }

    #[test]
    fn test_unknown_sound() {
        let mut audio = AudioManager::new(NullAudio::default());
        assert_eq!(
            audio.play_sound(&store(), "laser", 0),
            Err(AssetError::MissingSound("laser".to_owned()))
        );
        assert!(audio.device().log().is_empty());
    }

    #[test]
    fn test_no_channels() {
        let mut audio = AudioManager::new(NullAudio::new(0));
        assert_eq!(audio.play_sound(&store(), "shot", 0), Ok(None));
    }
}

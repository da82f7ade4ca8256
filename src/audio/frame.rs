// One stereo frame, the unit the engine mixes in
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub fn zero() -> Self {
        Self::default()
    }

    // downmix for single-channel devices
    pub fn mono(self) -> f32 {
        (self.left + self.right) * 0.5
    }
}

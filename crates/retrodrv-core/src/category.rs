use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// A pluggable backend subsystem managed by the frontend.
pub enum DriverCategory {
    Video,
    Audio,
    Input,
    Joypad,
    Camera,
    Location,
    Menu,
    Record,
    AudioResampler,
}

impl DriverCategory {
    pub const COUNT: usize = 9;

    pub const ALL: [DriverCategory; DriverCategory::COUNT] = [
        DriverCategory::Video,
        DriverCategory::Audio,
        DriverCategory::Input,
        DriverCategory::Joypad,
        DriverCategory::Camera,
        DriverCategory::Location,
        DriverCategory::Menu,
        DriverCategory::Record,
        DriverCategory::AudioResampler,
    ];

    /// Resolves a free-text category label such as `"video driver"`.
    ///
    /// The set of labels is closed; anything else yields `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "video driver" => Some(Self::Video),
            "audio driver" => Some(Self::Audio),
            "input driver" => Some(Self::Input),
            "input joypad driver" => Some(Self::Joypad),
            "camera driver" => Some(Self::Camera),
            "location driver" => Some(Self::Location),
            "menu driver" => Some(Self::Menu),
            "record driver" => Some(Self::Record),
            "audio resampler driver" => Some(Self::AudioResampler),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Video => "video driver",
            Self::Audio => "audio driver",
            Self::Input => "input driver",
            Self::Joypad => "input joypad driver",
            Self::Camera => "camera driver",
            Self::Location => "location driver",
            Self::Menu => "menu driver",
            Self::Record => "record driver",
            Self::AudioResampler => "audio resampler driver",
        }
    }

    /// Whether backends for this category are part of the current build.
    pub const fn is_compiled_in(self) -> bool {
        match self {
            Self::Menu => cfg!(feature = "menu"),
            _ => true,
        }
    }

    #[inline]
    pub(crate) const fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for DriverCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Input => "input",
            Self::Joypad => "joypad",
            Self::Camera => "camera",
            Self::Location => "location",
            Self::Menu => "menu",
            Self::Record => "record",
            Self::AudioResampler => "audio resampler",
        };
        f.write_str(name)
    }
}

/// Set of categories used to scope init/uninit.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DriverFlags {
    members: u16,
}

impl DriverFlags {
    pub const NONE: DriverFlags = DriverFlags { members: 0 };
    pub const VIDEO: DriverFlags = DriverFlags::single(DriverCategory::Video);
    pub const AUDIO: DriverFlags = DriverFlags::single(DriverCategory::Audio);
    pub const INPUT: DriverFlags = DriverFlags::single(DriverCategory::Input);
    pub const CAMERA: DriverFlags = DriverFlags::single(DriverCategory::Camera);
    pub const LOCATION: DriverFlags = DriverFlags::single(DriverCategory::Location);
    pub const MENU: DriverFlags = DriverFlags::single(DriverCategory::Menu);
    pub const VIDEO_INPUT: DriverFlags = DriverFlags::VIDEO.union(DriverFlags::INPUT);
    /// Every category that scoped init/uninit acts on.
    pub const ALL: DriverFlags = DriverFlags::VIDEO_INPUT
        .union(DriverFlags::AUDIO)
        .union(DriverFlags::CAMERA)
        .union(DriverFlags::LOCATION)
        .union(DriverFlags::MENU);

    pub const fn single(category: DriverCategory) -> Self {
        Self {
            members: 1 << category.slot(),
        }
    }

    pub const fn union(self, other: DriverFlags) -> Self {
        Self {
            members: self.members | other.members,
        }
    }

    pub const fn contains(self, category: DriverCategory) -> bool {
        self.members & (1 << category.slot()) != 0
    }

    /// True when at least one category is shared with `other`.
    pub const fn intersects(self, other: DriverFlags) -> bool {
        self.members & other.members != 0
    }

    pub const fn is_empty(self) -> bool {
        self.members == 0
    }

    pub fn insert(&mut self, category: DriverCategory) {
        self.members |= 1 << category.slot();
    }

    pub fn remove(&mut self, category: DriverCategory) {
        self.members &= !(1 << category.slot());
    }

    pub fn iter(self) -> impl Iterator<Item = DriverCategory> {
        DriverCategory::ALL
            .into_iter()
            .filter(move |&c| self.contains(c))
    }
}

impl std::ops::BitOr for DriverFlags {
    type Output = DriverFlags;

    fn bitor(self, rhs: DriverFlags) -> DriverFlags {
        self.union(rhs)
    }
}

impl From<DriverCategory> for DriverFlags {
    fn from(category: DriverCategory) -> Self {
        DriverFlags::single(category)
    }
}

impl FromIterator<DriverCategory> for DriverFlags {
    fn from_iter<I: IntoIterator<Item = DriverCategory>>(iter: I) -> Self {
        let mut flags = DriverFlags::NONE;
        for category in iter {
            flags.insert(category);
        }
        flags
    }
}

impl fmt::Debug for DriverFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

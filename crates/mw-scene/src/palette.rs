use mw_core::mood::Mood;

/// RGB color.
pub type Rgb = (u8, u8, u8);

const fn hex(v: u32) -> Rgb {
    (((v >> 16) & 0xff) as u8, ((v >> 8) & 0xff) as u8, (v & 0xff) as u8)
}

const BASS: [Rgb; 4] = [hex(0x55c1ff), hex(0x35d0c3), hex(0x9fd3ff), hex(0xbfe9ff)];
const TREBLE: [Rgb; 4] = [hex(0x39a9ff), hex(0x22e0c3), hex(0xcfe7ff), hex(0xe6f2ff)];
const JOYFUL: [Rgb; 4] = [hex(0x4fd1ff), hex(0x3de6c8), hex(0xb6f5ff), hex(0xffffff)];
const MELANCHOLIC: [Rgb; 4] = [hex(0x89b4ff), hex(0x6fd9ce), hex(0xcfe9f9), hex(0xeaf2ff)];

/// The four colors entities of `mood` are drawn from.
///
/// # Example
/// ```
/// use mw_core::mood::Mood;
/// use mw_scene::palette::palette;
/// assert_eq!(palette(Mood::Joyful)[3], (255, 255, 255));
/// ```
#[must_use]
pub fn palette(mood: Mood) -> &'static [Rgb; 4] {
    match mood {
        Mood::Bass => &BASS,
        Mood::Treble => &TREBLE,
        Mood::Joyful => &JOYFUL,
        Mood::Melancholic => &MELANCHOLIC,
    }
}

/// `#rrggbb` form of a color.
#[must_use]
pub fn to_hex(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

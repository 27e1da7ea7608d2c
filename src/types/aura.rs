//! Aura catalog
//!
//! Ten fixed profiles; one is drawn uniformly at random per reveal.

use serde::{Deserialize, Serialize};

/// Ambient loop played once an aura is revealed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundTrack {
    Playtime,
    Love,
    Dark,
    Calm,
}

impl SoundTrack {
    pub const ALL: [SoundTrack; 4] = [
        SoundTrack::Playtime,
        SoundTrack::Love,
        SoundTrack::Dark,
        SoundTrack::Calm,
    ];

    /// Asset file for the track
    pub fn file_name(&self) -> &'static str {
        match self {
            SoundTrack::Playtime => "songs/playtime-bedtime-193378.mp3",
            SoundTrack::Love => "songs/fall-in-love-with-a-stranger-piano-bar-lounge-music-5853.mp3",
            SoundTrack::Dark => "songs/8-bit-halloween-story-166454.mp3",
            SoundTrack::Calm => "songs/please-calm-my-mind-125566.mp3",
        }
    }
}

impl std::fmt::Display for SoundTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SoundTrack::Playtime => "playtime",
            SoundTrack::Love => "love",
            SoundTrack::Dark => "dark",
            SoundTrack::Calm => "calm",
        };
        write!(f, "{}", name)
    }
}

/// One aura in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuraProfile {
    pub color_name: &'static str,
    pub color_hex: &'static str,
    pub description: &'static str,
    pub sound_track: SoundTrack,
}

impl AuraProfile {
    /// Parse `color_hex` (`#RGB` or `#RRGGBB`) into components
    pub fn rgb(&self) -> (u8, u8, u8) {
        parse_hex_color(self.color_hex).unwrap_or((0, 0, 0))
    }

    /// Look up a catalog entry by color name (case-insensitive)
    pub fn by_name(name: &str) -> Option<&'static AuraProfile> {
        AURA_CATALOG
            .iter()
            .find(|a| a.color_name.eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for AuraProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.color_name, self.color_hex)
    }
}

/// Short hex digits are doubled: `#fff` is `#ffffff`
fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        3 => {
            let expand = |i: usize| channel(&digits[i..i + 1].repeat(2));
            Some((expand(0)?, expand(1)?, expand(2)?))
        }
        6 => Some((channel(&digits[0..2])?, channel(&digits[2..4])?, channel(&digits[4..6])?)),
        _ => None,
    }
}

pub static AURA_CATALOG: [AuraProfile; 10] = [
    AuraProfile {
        color_name: "Red",
        color_hex: "#CF2E2E",
        description: "You are both emotionally and psychically grounded or balanced. Material wealth and spending is a fun game, and you hate to deny yourself the simple pleasures in life.",
        sound_track: SoundTrack::Playtime,
    },
    AuraProfile {
        color_name: "Orange",
        color_hex: "#FF6900",
        description: "You are quick to make and keep friends. Your emotions are highly influenced by the relationships you have with others.",
        sound_track: SoundTrack::Playtime,
    },
    AuraProfile {
        color_name: "Yellow",
        color_hex: "#FCB900",
        description: "You have a playful awakened spirit, a high self-esteem, high intellect and a huge hunger for greatness.",
        sound_track: SoundTrack::Playtime,
    },
    AuraProfile {
        color_name: "Green",
        color_hex: "#00D084",
        description: "You are either in love with someone who balances you out, or you have a kind, loving heart. You have also a loving kindness towards animals, plants, friends, family and life in general.",
        sound_track: SoundTrack::Love,
    },
    AuraProfile {
        color_name: "Blue",
        color_hex: "#0693E3",
        description: "You are usually in a calm state of mind. You can't be bothered easily. You are frequently a support system for your friends and family.",
        sound_track: SoundTrack::Calm,
    },
    AuraProfile {
        color_name: "Indigo",
        color_hex: "#4B0082",
        description: "You search for the truths that the unknown holds and you can sense other people's energies. You can also see past the deceit that people try to pass as truth.",
        sound_track: SoundTrack::Dark,
    },
    AuraProfile {
        color_name: "Purple",
        color_hex: "#800080",
        description: "You are intuitive and the type of person to \"view the larger picture\". You love everyone and to guide others to their highest potential.",
        sound_track: SoundTrack::Love,
    },
    AuraProfile {
        color_name: "Pink",
        color_hex: "#F78DA7",
        description: "You are happy and in harmony with yourself and those around you. You are very gentle to yourself and others.",
        sound_track: SoundTrack::Calm,
    },
    AuraProfile {
        color_name: "Black",
        color_hex: "#000",
        description: "You have a large amount of built-up anger or grief inside of you. You haven't forgiven what has happened to you and you're still holding onto that pain.",
        sound_track: SoundTrack::Dark,
    },
    AuraProfile {
        color_name: "White",
        color_hex: "#fff",
        description: "In this life, you are more concerned with your positive impact in others lives. You don't care so much for material possession or needs.",
        sound_track: SoundTrack::Calm,
    },
];

use std::fmt;
use std::str::FromStr;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Channel layouts accepted by the preprocessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// Single luminance sample per pixel
    Gray,
    /// Red, green, blue samples per pixel
    Rgb,
}

impl Channels {
    /// Number of samples each pixel contributes to the buffer
    pub fn samples_per_pixel(&self) -> usize {
        match self {
            Channels::Gray => 1,
            Channels::Rgb => 3,
        }
    }
}

/// Decoded pixel data as supplied by the caller.
///
/// The buffer is row-major with `samples_per_pixel` interleaved samples per
/// pixel. Construction validates the structure; the hash engines treat the
/// contents as read-only.
#[derive(Debug, Clone)]
pub struct RawImage {
    width: u32,
    height: u32,
    channels: Channels,
    samples: Vec<u8>,
}

impl RawImage {
    /// Build a raw image from validated parts.
    pub fn new(width: u32, height: u32, channels: Channels, samples: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidImage(format!(
                "zero dimension: {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize * channels.samples_per_pixel();
        if samples.len() != expected {
            return Err(Error::InvalidImage(format!(
                "sample buffer holds {} bytes, expected {}",
                samples.len(),
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Build a raw image from a numeric channel count, as decoders report it.
    pub fn from_samples(width: u32, height: u32, channels: u8, samples: Vec<u8>) -> Result<Self> {
        let channels = match channels {
            1 => Channels::Gray,
            3 => Channels::Rgb,
            n => {
                return Err(Error::InvalidImage(format!(
                    "unsupported channel count: {}",
                    n
                )))
            }
        };
        Self::new(width, height, channels, samples)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }
}

/// A DCT perceptual hash represented as a 64-bit value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DctHash(pub u64);

impl DctHash {
    /// Width of the fingerprint in bits
    pub const BITS: u32 = 64;

    /// Calculate the Hamming distance between two DCT hashes
    pub fn distance(&self, other: &DctHash) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Check if two hashes are perceptually similar based on a threshold
    pub fn is_similar(&self, other: &DctHash, threshold: u32) -> bool {
        self.distance(other) <= threshold
    }

    /// The 8-byte big-endian form
    pub fn to_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Rebuild a hash from its 8-byte big-endian form
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        DctHash(u64::from_be_bytes(bytes))
    }

    /// The unsigned decimal-string form, kept for compatibility with hosts
    /// that store 64-bit hashes as strings
    pub fn to_decimal_string(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for DctHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DctHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = s
            .parse::<u64>()
            .map_err(|e| Error::InvalidFingerprint(format!("not a 64-bit decimal hash: {}", e)))?;
        Ok(DctHash(value))
    }
}

impl Serialize for DctHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

impl<'de> Deserialize<'de> for DctHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A Marr-Hildreth perceptual hash represented as a 576-bit value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MhHash(pub [u8; MhHash::BYTES]);

impl MhHash {
    /// Width of the fingerprint in bytes
    pub const BYTES: usize = 72;

    /// Width of the fingerprint in bits
    pub const BITS: u32 = 576;

    /// Calculate the Hamming distance between two MH hashes
    pub fn distance(&self, other: &MhHash) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    /// Check if two hashes are perceptually similar based on a threshold
    pub fn is_similar(&self, other: &MhHash, threshold: u32) -> bool {
        self.distance(other) <= threshold
    }

    /// The 72-byte buffer form
    pub fn as_bytes(&self) -> &[u8; MhHash::BYTES] {
        &self.0
    }

    /// Rebuild a hash from its 72-byte buffer form
    pub fn from_bytes(bytes: [u8; MhHash::BYTES]) -> Self {
        MhHash(bytes)
    }
}

impl fmt::Display for MhHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for MhHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != MhHash::BYTES * 2 || !s.is_ascii() {
            return Err(Error::InvalidFingerprint(format!(
                "expected {} hex characters, got {}",
                MhHash::BYTES * 2,
                s.len()
            )));
        }
        let mut bytes = [0u8; MhHash::BYTES];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[2 * i..2 * i + 2], 16)
                .map_err(|e| Error::InvalidFingerprint(format!("bad hex digit: {}", e)))?;
        }
        Ok(MhHash(bytes))
    }
}

impl Serialize for MhHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MhHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Either hash kind, as submitted to the distance comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fingerprint {
    Dct(DctHash),
    Mh(MhHash),
}

impl Fingerprint {
    /// Declared width of the fingerprint in bits
    pub fn bits(&self) -> u32 {
        match self {
            Fingerprint::Dct(_) => DctHash::BITS,
            Fingerprint::Mh(_) => MhHash::BITS,
        }
    }

    /// Rebuild a fingerprint from a raw byte buffer; the length selects the kind.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            8 => {
                let mut buffer = [0u8; 8];
                buffer.copy_from_slice(bytes);
                Ok(Fingerprint::Dct(DctHash::from_bytes(buffer)))
            }
            MhHash::BYTES => {
                let mut buffer = [0u8; MhHash::BYTES];
                buffer.copy_from_slice(bytes);
                Ok(Fingerprint::Mh(MhHash::from_bytes(buffer)))
            }
            n => Err(Error::InvalidFingerprint(format!(
                "{} bytes is neither an 8-byte DCT nor a 72-byte MH fingerprint",
                n
            ))),
        }
    }

    /// Rebuild a DCT fingerprint from its decimal-string form
    pub fn from_decimal(s: &str) -> Result<Self> {
        Ok(Fingerprint::Dct(s.parse()?))
    }
}

impl From<DctHash> for Fingerprint {
    fn from(hash: DctHash) -> Self {
        Fingerprint::Dct(hash)
    }
}

impl From<MhHash> for Fingerprint {
    fn from(hash: MhHash) -> Self {
        Fingerprint::Mh(hash)
    }
}

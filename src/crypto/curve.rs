/// Supported rotation key curves and their fixed parameters
use crate::error::{PlcError, PlcResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Elliptic curves accepted for did:plc rotation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Curve {
    /// secp256k1
    K256,
    /// NIST P-256 (secp256r1)
    P256,
}

/// Static per-curve constants
#[derive(Debug)]
pub struct CurveParams {
    /// Short name used in config and file names
    pub name: &'static str,
    /// Varint-encoded multicodec for a compressed public key
    pub multicodec: [u8; 2],
    /// Group order n, big-endian
    pub order: [u8; 32],
    /// floor(n / 2), big-endian
    pub half_order: [u8; 32],
}

// secp256k1-pub (0xe7) and p256-pub (0x1200) as unsigned varints
const K256_PARAMS: CurveParams = CurveParams {
    name: "k256",
    multicodec: [0xe7, 0x01],
    order: [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36,
        0x41, 0x41,
    ],
    half_order: [
        0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b,
        0x20, 0xa0,
    ],
};

const P256_PARAMS: CurveParams = CurveParams {
    name: "p256",
    multicodec: [0x80, 0x24],
    order: [
        0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xbc, 0xe6, 0xfa, 0xad, 0xa7, 0x17, 0x9e, 0x84, 0xf3, 0xb9, 0xca, 0xc2, 0xfc, 0x63,
        0x25, 0x51,
    ],
    half_order: [
        0x7f, 0xff, 0xff, 0xff, 0x80, 0x00, 0x00, 0x00, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xde, 0x73, 0x7d, 0x56, 0xd3, 0x8b, 0xcf, 0x42, 0x79, 0xdc, 0xe5, 0x61, 0x7e, 0x31,
        0x92, 0xa8,
    ],
};

impl Curve {
    /// All supported curves, in registry order
    pub const ALL: [Curve; 2] = [Curve::K256, Curve::P256];

    /// Fixed parameters for this curve
    pub fn params(&self) -> &'static CurveParams {
        match self {
            Curve::K256 => &K256_PARAMS,
            Curve::P256 => &P256_PARAMS,
        }
    }

    pub fn name(&self) -> &'static str {
        self.params().name
    }

    pub fn multicodec(&self) -> [u8; 2] {
        self.params().multicodec
    }

    /// Look a curve up by its multicodec prefix
    pub fn from_multicodec(prefix: &[u8]) -> PlcResult<Self> {
        Self::ALL
            .into_iter()
            .find(|curve| curve.multicodec() == prefix)
            .ok_or_else(|| {
                PlcError::UnsupportedCurve(format!("unknown multicodec prefix {}", hex::encode(prefix)))
            })
    }
}

impl FromStr for Curve {
    type Err = PlcError;

    fn from_str(s: &str) -> PlcResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "k256" | "secp256k1" => Ok(Curve::K256),
            "p256" | "secp256r1" => Ok(Curve::P256),
            other => Err(PlcError::UnsupportedCurve(format!(
                "curve must be 'k256' or 'p256', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

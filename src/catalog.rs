// Reference data shared by the booking form and the room listing
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Nightly rate used when a room type code cannot be resolved
pub const STANDARD_RATE: u32 = 80;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown room type: {0}")]
pub struct ParseRoomTypeError(pub String);

// Room types offered by the hotel, in catalog order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    #[default]
    Standard,
    Deluxe,
    Suite,
    Executive,
    Presidential,
}

impl RoomType {
    pub const ALL: [RoomType; 5] = [
        RoomType::Standard,
        RoomType::Deluxe,
        RoomType::Suite,
        RoomType::Executive,
        RoomType::Presidential,
    ];

    pub fn code(self) -> &'static str {
        match self {
            RoomType::Standard => "standard",
            RoomType::Deluxe => "deluxe",
            RoomType::Suite => "suite",
            RoomType::Executive => "executive",
            RoomType::Presidential => "presidential",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RoomType::Standard => "Standard",
            RoomType::Deluxe => "Deluxe",
            RoomType::Suite => "Suite",
            RoomType::Executive => "Executive",
            RoomType::Presidential => "Presidential",
        }
    }

    pub fn nightly_rate(self) -> u32 {
        match self {
            RoomType::Standard => STANDARD_RATE,
            RoomType::Deluxe => 120,
            RoomType::Suite => 200,
            RoomType::Executive => 180,
            RoomType::Presidential => 500,
        }
    }

    // Option label shown in the booking form's room selector
    pub fn booking_label(self) -> String {
        let room_name = match self {
            RoomType::Suite => "Suite".to_string(),
            RoomType::Presidential => "Presidential Suite".to_string(),
            other => format!("{} Room", other.display_name()),
        };
        format!("{} - £{}/night", room_name, self.nightly_rate())
    }

    // Label shown in the booking summary, i.e. the option label without the price
    pub fn summary_label(self) -> String {
        let label = self.booking_label();
        match label.split_once(" - ") {
            Some((name, _)) => name.to_string(),
            None => label,
        }
    }

    // Catalog entry for a listing index, cycling through the catalog
    pub fn for_index(index: usize) -> RoomType {
        Self::ALL[index % Self::ALL.len()]
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RoomType {
    type Err = ParseRoomTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|room_type| room_type.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| ParseRoomTypeError(s.to_string()))
    }
}

// Rate lookup by raw code; unrecognised codes are charged at the standard rate
pub fn nightly_rate_for(code: &str) -> u32 {
    code.parse::<RoomType>()
        .map(RoomType::nightly_rate)
        .unwrap_or(STANDARD_RATE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Amenity {
    #[serde(rename = "Free WiFi")]
    FreeWifi,
    #[serde(rename = "Parking")]
    Parking,
    #[serde(rename = "Room Service")]
    RoomService,
    #[serde(rename = "Smart TV")]
    SmartTv,
    #[serde(rename = "En-suite Bathroom")]
    EnSuiteBathroom,
}

impl Amenity {
    pub const ALL: [Amenity; 5] = [
        Amenity::FreeWifi,
        Amenity::Parking,
        Amenity::RoomService,
        Amenity::SmartTv,
        Amenity::EnSuiteBathroom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Amenity::FreeWifi => "Free WiFi",
            Amenity::Parking => "Parking",
            Amenity::RoomService => "Room Service",
            Amenity::SmartTv => "Smart TV",
            Amenity::EnSuiteBathroom => "En-suite Bathroom",
        }
    }
}

impl fmt::Display for Amenity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Part 2: Room listing generation and filtering
use crate::catalog::{Amenity, RoomType};
use crate::part1_booking::BookingDraft;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

// Facet value that disables the room type filter
pub const ALL_TYPES: &str = "all";

pub const ROOM_PRICE_RANGE: (u32, u32) = (80, 500);
pub const ROOM_CAPACITY_RANGE: (u8, u8) = (1, 6);
pub const ROOM_SIZE_RANGE: (u32, u32) = (25, 80);
pub const AMENITY_COUNT_RANGE: (usize, usize) = (3, 5);
pub const AVAILABILITY_PROBABILITY: f64 = 0.8;

// Rooms shown on the listing page
pub const DEFAULT_ROOM_COUNT: usize = 12;

const DESCRIPTION_SENTENCES: [&str; 8] = [
    "Bright and quiet, with views over the garden courtyard.",
    "Furnished with a comfortable work desk and blackout curtains.",
    "Freshly renovated with locally made furniture.",
    "A generous seating area makes it ideal for longer stays.",
    "Close to the lifts and the rooftop lounge.",
    "Daily housekeeping and fresh linen are included.",
    "Large windows let in plenty of natural light.",
    "Thick walls and double glazing keep street noise out.",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub price: u32,
    pub capacity: u8,
    pub size: u32,
    pub amenities: Vec<Amenity>,
    pub description: String,
    pub availability: bool,
}

impl Room {
    // Lower-cased type name the facet filter compares against
    pub fn type_key(&self) -> String {
        self.room_type.display_name().to_lowercase()
    }

    fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.room_type.display_name().to_lowercase().contains(needle)
    }

    // Draft preselected from the room's "Book Now" link
    pub fn booking_draft(&self) -> BookingDraft {
        BookingDraft {
            room_type: self.room_type,
            room_id: Some(self.id.clone()),
            ..BookingDraft::default()
        }
    }
}

/// Generate `count` demo rooms from the given random source.
///
/// Room types cycle through the catalog by index, starting at `standard`. Every other
/// attribute is drawn from `rng`, so a seeded generator yields the same listing each time.
pub fn generate_rooms<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Room> {
    let rooms: Vec<Room> = (0..count)
        .map(|index| {
            let room_type = RoomType::for_index(index);
            let amenity_count = rng.gen_range(AMENITY_COUNT_RANGE.0..=AMENITY_COUNT_RANGE.1);
            let description = DESCRIPTION_SENTENCES
                .choose_multiple(rng, 2)
                .copied()
                .collect::<Vec<_>>()
                .join(" ");

            Room {
                id: uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string(),
                name: format!("{} Room {}", room_type.display_name(), index + 1),
                room_type,
                price: rng.gen_range(ROOM_PRICE_RANGE.0..=ROOM_PRICE_RANGE.1),
                capacity: rng.gen_range(ROOM_CAPACITY_RANGE.0..=ROOM_CAPACITY_RANGE.1),
                size: rng.gen_range(ROOM_SIZE_RANGE.0..=ROOM_SIZE_RANGE.1),
                amenities: Amenity::ALL
                    .choose_multiple(rng, amenity_count)
                    .copied()
                    .collect(),
                description,
                availability: rng.gen_bool(AVAILABILITY_PROBABILITY),
            }
        })
        .collect();

    debug!(count = rooms.len(), "generated room listing");
    rooms
}

// Extract rooms matching the search term and type facet, keeping input order
pub fn filter_rooms(rooms: &[Room], search_term: &str, filter_type: &str) -> Vec<Room> {
    let needle = search_term.to_lowercase();
    let wanted_type = filter_type.to_lowercase();

    rooms
        .iter()
        .filter(|room| needle.is_empty() || room.matches_search(&needle))
        .filter(|room| filter_type == ALL_TYPES || room.type_key() == wanted_type)
        .cloned()
        .collect()
}

// Facet options: "all" followed by each type present, in first-seen order
pub fn distinct_types(rooms: &[Room]) -> Vec<String> {
    let mut types = vec![ALL_TYPES.to_string()];
    for room in rooms {
        let key = room.type_key();
        if !types.contains(&key) {
            types.push(key);
        }
    }
    types
}

pub fn type_option_label(filter_type: &str) -> String {
    if filter_type == ALL_TYPES {
        return "All Room Types".to_string();
    }
    let mut chars = filter_type.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomFilterState {
    pub search_term: String,
    pub filter_type: String,
}

impl Default for RoomFilterState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            filter_type: ALL_TYPES.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOption {
    pub value: String,
    pub label: String,
}

// Listing page state: the generated rooms, the active filters and the derived view
#[derive(Debug, Clone, Default)]
pub struct RoomListing {
    rooms: Vec<Room>,
    filter: RoomFilterState,
    filtered: Vec<Room>,
}

impl RoomListing {
    pub fn new(rooms: Vec<Room>) -> Self {
        let filtered = rooms.clone();
        Self {
            rooms,
            filter: RoomFilterState::default(),
            filtered,
        }
    }

    pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        Self::new(generate_rooms(count, rng))
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn filter(&self) -> &RoomFilterState {
        &self.filter
    }

    pub fn filtered(&self) -> &[Room] {
        &self.filtered
    }

    pub fn set_search_term(&mut self, search_term: &str) {
        self.filter.search_term = search_term.to_string();
        self.refresh();
    }

    pub fn set_filter_type(&mut self, filter_type: &str) {
        self.filter.filter_type = filter_type.to_string();
        self.refresh();
    }

    pub fn replace_rooms(&mut self, rooms: Vec<Room>) {
        self.rooms = rooms;
        self.refresh();
    }

    pub fn type_options(&self) -> Vec<TypeOption> {
        distinct_types(&self.rooms)
            .into_iter()
            .map(|value| TypeOption {
                label: type_option_label(&value),
                value,
            })
            .collect()
    }

    pub fn find(&self, room_id: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == room_id)
    }

    pub fn available_count(&self) -> usize {
        self.filtered.iter().filter(|room| room.availability).count()
    }

    // Shown in place of the grid when nothing matches
    pub fn is_empty_result(&self) -> bool {
        self.filtered.is_empty()
    }

    fn refresh(&mut self) {
        self.filtered = filter_rooms(
            &self.rooms,
            &self.filter.search_term,
            &self.filter.filter_type,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use test_case::test_case;

    fn seeded_rooms(count: usize) -> Vec<Room> {
        let mut rng = StdRng::seed_from_u64(42);
        generate_rooms(count, &mut rng)
    }

    #[test]
    fn test_generate_twelve_rooms_cycles_types() {
        let rooms = seeded_rooms(12);
        assert_eq!(rooms.len(), 12);
        for (index, room) in rooms.iter().enumerate() {
            assert_eq!(room.room_type, RoomType::ALL[index % 5]);
            assert_eq!(
                room.name,
                format!("{} Room {}", room.room_type.display_name(), index + 1)
            );
        }
        assert_eq!(rooms[0].room_type, RoomType::Standard);
        assert_eq!(rooms[11].room_type, RoomType::Deluxe);
    }

    #[test]
    fn test_generated_attributes_within_ranges() {
        let rooms = seeded_rooms(200);
        for room in &rooms {
            assert!((80..=500).contains(&room.price), "price {}", room.price);
            assert!((1..=6).contains(&room.capacity), "capacity {}", room.capacity);
            assert!((25..=80).contains(&room.size), "size {}", room.size);
            assert!((3..=5).contains(&room.amenities.len()));
            let unique: HashSet<_> = room.amenities.iter().collect();
            assert_eq!(unique.len(), room.amenities.len(), "amenities repeat");
            assert!(!room.description.is_empty());
        }

        let ids: HashSet<_> = rooms.iter().map(|room| room.id.as_str()).collect();
        assert_eq!(ids.len(), rooms.len(), "room ids must be unique");

        // availability is biased towards true
        let available = rooms.iter().filter(|room| room.availability).count();
        assert!(available > 120 && available < 190, "available {}", available);
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        assert_eq!(seeded_rooms(12), seeded_rooms(12));
        let mut other = StdRng::seed_from_u64(7);
        assert_ne!(seeded_rooms(12), generate_rooms(12, &mut other));
    }

    #[test]
    fn test_empty_filters_are_identity() {
        let rooms = seeded_rooms(12);
        assert_eq!(filter_rooms(&rooms, "", ALL_TYPES), rooms);
    }

    #[test_case("suite", ALL_TYPES, vec![3, 8]; "#1 search by type name")]
    #[test_case("SUITE", ALL_TYPES, vec![3, 8]; "#2 search ignores case")]
    #[test_case("room 1", ALL_TYPES, vec![1, 10, 11, 12]; "#3 search by name")]
    #[test_case("", "deluxe", vec![2, 7, 12]; "#4 facet only")]
    #[test_case("", "Executive", vec![4, 9]; "#5 facet ignores case")]
    #[test_case("room 1", "deluxe", vec![12]; "#6 combined filters")]
    #[test_case("penthouse", ALL_TYPES, vec![]; "#7 no match")]
    #[test_case("", "ALL", vec![]; "#8 facet all is exact")]
    fn test_filter_rooms(search_term: &str, filter_type: &str, expected_numbers: Vec<usize>) {
        let rooms = seeded_rooms(12);
        let results = filter_rooms(&rooms, search_term, filter_type);
        let expected_names: Vec<String> = expected_numbers
            .iter()
            .map(|number| rooms[number - 1].name.clone())
            .collect();
        let names: Vec<String> = results.iter().map(|room| room.name.clone()).collect();
        assert_eq!(names, expected_names);
    }

    #[test]
    fn test_filter_is_idempotent_and_non_mutating() {
        let rooms = seeded_rooms(12);
        let before = rooms.clone();
        let once = filter_rooms(&rooms, "room", "standard");
        let twice = filter_rooms(&once, "room", "standard");
        assert_eq!(once, twice);
        assert_eq!(rooms, before);
    }

    #[test]
    fn test_distinct_types_first_seen_order() {
        let rooms = seeded_rooms(12);
        assert_eq!(
            distinct_types(&rooms),
            vec!["all", "standard", "deluxe", "suite", "executive", "presidential"]
        );
        assert_eq!(distinct_types(&rooms[..2]), vec!["all", "standard", "deluxe"]);
        assert_eq!(distinct_types(&[]), vec!["all"]);
    }

    #[test]
    fn test_listing_recomputes_view() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut listing = RoomListing::generate(DEFAULT_ROOM_COUNT, &mut rng);
        assert_eq!(listing.filtered().len(), 12);

        listing.set_filter_type("suite");
        assert_eq!(listing.filtered().len(), 2);
        assert!(listing.filtered().iter().all(|room| room.room_type == RoomType::Suite));

        listing.set_search_term("Room 8");
        assert_eq!(listing.filtered().len(), 1);

        listing.set_search_term("nothing here");
        assert!(listing.is_empty_result());
        assert_eq!(listing.available_count(), 0);

        listing.set_search_term("");
        listing.set_filter_type(ALL_TYPES);
        assert_eq!(listing.filtered(), listing.rooms());

        listing.replace_rooms(listing.rooms()[..3].to_vec());
        assert_eq!(listing.filtered().len(), 3);
    }

    #[test]
    fn test_type_option_labels() {
        let listing = RoomListing::new(seeded_rooms(3));
        let options = listing.type_options();
        let labels: Vec<&str> = options.iter().map(|option| option.label.as_str()).collect();
        assert_eq!(labels, vec!["All Room Types", "Standard", "Deluxe", "Suite"]);
        assert_eq!(options[1].value, "standard");
    }

    #[test]
    fn test_booking_draft_from_room() {
        let listing = RoomListing::new(seeded_rooms(5));
        let room = &listing.rooms()[4];
        let found = listing.find(&room.id).unwrap();
        let draft = found.booking_draft();
        assert_eq!(draft.room_type, RoomType::Presidential);
        assert_eq!(draft.room_id.as_deref(), Some(room.id.as_str()));
        assert_eq!(draft.guests, 1);
        assert!(listing.find("missing").is_none());
    }

    #[test]
    fn test_room_serializes_type_field() {
        let room = &seeded_rooms(1)[0];
        let json = serde_json::to_value(room).unwrap();
        assert_eq!(json["type"], "standard");
        assert!(json["amenities"].is_array());
        assert!(json.get("availability").is_some());
    }
}

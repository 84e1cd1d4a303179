//! Vehicle record assembled by the extraction pipeline
//!
//! Field groups mirror the source site's page structure: `Specification` for
//! the trim-page technical data, `Features` for equipment markers, `Offering`
//! for the ad-level data. Fields never seen on any page keep their zero value
//! (empty string, zero number, `Availability::Unknown`).

use serde::{Deserialize, Serialize};

/// Tri-state equipment marker derived from the trim page's icons.
///
/// `Unknown` means the field was never seen on the page and is distinct from
/// an explicit "—" placeholder, which maps to `No`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    Unknown,
    Yes,
    Option,
    No,
}

/// Steering wheel side, mapped from the site's localized tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SteeringPosition {
    #[default]
    Unknown,
    Left,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    pub fuel_used: String,
    pub engine_type: String,
    /// Displacement in cubic centimeters.
    pub capacity: f64,
    /// Peak output in horsepower.
    pub max_power: f64,
    /// Verbatim torque descriptor, e.g. "250 (25) при 4000".
    pub max_torque: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Steering {
    pub position: SteeringPosition,
    /// Assist kind when present: "Гидроусилитель" or "Электроусилитель".
    pub power_steering: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suspension {
    pub front_stabilizer: Availability,
    pub back_stabilizer: Availability,
    pub front_suspension: String,
    pub back_suspension: String,
}

/// One axle's tire size decomposed from the `NNN/NN RNN` notation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TireSize {
    pub width: u32,
    pub aspect_ratio: u32,
    pub rim_diameter: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tires {
    pub front: TireSize,
    pub back: TireSize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Brakes {
    pub front_brakes: String,
    pub back_brakes: String,
    pub parking_brake: String,
}

/// Technical specification, populated mostly from the trim page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub body: String,
    /// Body dimensions in millimeters.
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub ground_clearance: f64,
    pub drag_coefficient: f64,
    pub front_track_width: f64,
    pub back_track_width: f64,
    pub wheelbase: f64,
    pub acceleration_0_to_100: f64,
    pub max_speed: f64,
    /// Fuel consumption in liters per 100 km.
    pub city_fuel_consumption: f64,
    pub highway_fuel_consumption: f64,
    pub mixed_fuel_consumption: f64,
    pub number_of_seats: u32,
    pub trunk_volume: f64,
    pub mass: f64,
    pub engine: Engine,
    pub gearbox: String,
    pub drive: String,
    pub steering: Steering,
    pub suspension: Suspension,
    pub tires: Tires,
    pub brakes: Brakes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lights {
    /// Headlight technology; the last matching label on the page wins.
    pub headlights: String,
    pub led_running_lights: Availability,
    pub led_tail_lights: Availability,
    pub light_sensor: Availability,
    pub front_fog_lights: Availability,
    pub back_fog_lights: Availability,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Airbags {
    pub driver: Availability,
    pub front_passenger: Availability,
    pub side: Availability,
    pub curtain: Availability,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetySystems {
    pub abs: Availability,
    pub ebd: Availability,
    pub bas: Availability,
    pub esp: Availability,
    pub tcs: Availability,
    pub cruise_control: Availability,
    pub front_parking_sensor: Availability,
    pub back_parking_sensor: Availability,
    pub rear_view_camera: Availability,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Multimedia {
    pub on_board_computer: Availability,
    pub mp3_support: Availability,
    pub hands_free: Availability,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interior {
    /// Upholstery kind: "Тканевая", "Кожаная" or "Комбинированная".
    pub upholstery: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CabinClimate {
    pub air_conditioner: Availability,
    pub climate_control: Availability,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElectricOptions {
    pub rain_sensor: Availability,
    pub side_mirror_drive: Availability,
    pub side_mirror_heating: Availability,
    pub trunk_opener: Availability,
    pub rear_window_heating: Availability,
    pub driver_seat_drive: Availability,
    pub front_seats_drive: Availability,
    pub front_seats_heating: Availability,
    pub back_seats_heating: Availability,
    pub front_window_lifts: Availability,
    pub back_window_lifts: Availability,
    pub steering_wheel_heating: Availability,
    pub windshield_heating: Availability,
}

/// Equipment and appearance markers, populated from detail and trim pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub color: String,
    pub lights: Lights,
    pub airbags: Airbags,
    pub safety: SafetySystems,
    pub multimedia: Multimedia,
    pub interior: Interior,
    pub climate: CabinClimate,
    pub electric: ElectricOptions,
    pub alarm: Availability,
}

/// Ad-level offering data from the listing and detail pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    /// Display price, e.g. "1 250 000 ₽".
    pub price: String,
    /// Odometer text, or the "новый автомобиль" sentinel for unused vehicles.
    pub kilometerage: String,
    pub year: i32,
    pub photo_urls: Vec<String>,
}

/// One extracted vehicle.
///
/// `id` is assigned by the orchestrator in output order and is dense within
/// one extraction batch; it is not a source-site identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: usize,
    pub full_name: String,
    pub description: String,
    pub trim_level: String,
    pub generation: String,
    pub specs: Specification,
    pub features: Features,
    pub offering: Offering,
}

impl Vehicle {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Formats a raw price into the display form: digits grouped in threes from
/// the right with the ruble sign appended, e.g. `"1250000"` → `"1 250 000 ₽"`.
///
/// Non-digit characters in the input (spaces, currency marks) are discarded
/// before grouping; an input with no digits at all is returned trimmed with
/// the ruble sign.
pub fn format_price(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return format!("{} ₽", raw.trim()).trim_start().to_string();
    }

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    let lead = digits.len() % 3;
    if lead > 0 {
        grouped.push_str(&digits[..lead]);
    }
    for (i, chunk) in digits.as_bytes()[lead..].chunks(3).enumerate() {
        if lead > 0 || i > 0 {
            grouped.push(' ');
        }
        // Chunks are ASCII digits by construction.
        grouped.push_str(std::str::from_utf8(chunk).unwrap_or_default());
    }

    format!("{grouped} ₽")
}

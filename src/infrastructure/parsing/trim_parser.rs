//! Trim-page field extraction
//!
//! A trim page is one large characteristics table. Extraction is driven by a
//! label→rule dispatch table iterated once over all cells: adding a field is
//! a data change, not a code change. Parse failures are field-scoped — the
//! scan always attempts the full field set and only afterwards fails the call
//! when any failure was recorded.

use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::dom::{element_text, next_element, parent_element};
use super::error::{AggregateParseError, FieldFailure};
use super::link_collector::compile;
use super::site_profile::{CHECK_MARK, NO_PLACEHOLDER, OPTION_MARK};
use crate::domain::vehicle::{Availability, TireSize, Vehicle};

/// Leading digit run of a value like "150 (110) при 6000".
static LEADING_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+").expect("leading digits pattern"));

/// Digit runs of a dimensions value like "4300x1800x1490".
static DIGIT_RUNS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit runs pattern"));

/// Tire size notation, e.g. "205/55 R16".
static TIRE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{3}/\d{2}\sR\d{2}").expect("tire pattern"));
static TIRE_WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)").expect("tire width pattern"));
static TIRE_ASPECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)").expect("tire aspect pattern"));
static TIRE_RIM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"R(\d+)").expect("tire rim pattern"));

type StringField = for<'a> fn(&'a mut Vehicle) -> &'a mut String;
type DecimalField = for<'a> fn(&'a mut Vehicle) -> &'a mut f64;
type CountField = for<'a> fn(&'a mut Vehicle) -> &'a mut u32;
type TireField = for<'a> fn(&'a mut Vehicle) -> &'a mut TireSize;
type ToggleField = for<'a> fn(&'a mut Vehicle) -> &'a mut Availability;

/// How a recognized label's adjacent value is applied to the vehicle.
#[derive(Clone, Copy)]
enum CellRule {
    /// Assign the trimmed cell text verbatim.
    Text(StringField),
    /// Assign the trimmed cell text only when the field is still empty.
    TextIfEmpty(StringField),
    /// Parse the cell text as a decimal number (decimal comma tolerated).
    Decimal(DecimalField),
    /// Parse the cell text as a small integer count.
    Count(CountField),
    /// Parse the leading digit run of the cell text as a decimal number.
    LeadingDecimal(DecimalField),
    /// Three digit runs assigned to length/width/height in order.
    BodyDimensions,
    /// Decompose a `NNN/NN RNN` tire notation into its components.
    Tire(TireField),
    /// Tri-state marker derived from the nearest icon reference.
    Toggle(ToggleField),
    /// Assign a fixed label when the value cell carries a checkmark icon.
    Marked {
        value: &'static str,
        target: StringField,
    },
}

/// Label → rule table covering the trim page's field vocabulary.
///
/// Mutually-exclusive labels (headlight technologies, upholstery kinds) write
/// to the same destination field; the last matching label in the scan wins.
static RULES: LazyLock<HashMap<&'static str, CellRule>> = LazyLock::new(|| {
    use CellRule::{BodyDimensions, Count, Decimal, LeadingDecimal, Marked, Text, TextIfEmpty, Tire, Toggle};

    let entries = [
        ("Название комплектации", Text(|v| &mut v.trim_level)),
        ("Тип привода", Text(|v| &mut v.specs.drive)),
        ("Тип кузова", TextIfEmpty(|v| &mut v.specs.body)),
        ("Тип трансмиссии", Text(|v| &mut v.specs.gearbox)),
        ("Объем двигателя, куб.см", Decimal(|v| &mut v.specs.engine.capacity)),
        ("Время разгона 0-100 км/ч, с", Decimal(|v| &mut v.specs.acceleration_0_to_100)),
        ("Максимальная скорость, км/ч", Decimal(|v| &mut v.specs.max_speed)),
        ("Клиренс (высота дорожного просвета), мм", Decimal(|v| &mut v.specs.ground_clearance)),
        ("Габариты кузова (Д x Ш x В), мм", BodyDimensions),
        ("Число мест", Count(|v| &mut v.specs.number_of_seats)),
        ("Колесная база, мм", Decimal(|v| &mut v.specs.wheelbase)),
        ("Ширина передней колеи, мм", Decimal(|v| &mut v.specs.front_track_width)),
        ("Ширина задней колеи, мм", Decimal(|v| &mut v.specs.back_track_width)),
        ("Масса, кг", Decimal(|v| &mut v.specs.mass)),
        ("Объем багажника, л", LeadingDecimal(|v| &mut v.specs.trunk_volume)),
        (
            "Коэффициент аэродинамического сопротивления, cW",
            Decimal(|v| &mut v.specs.drag_coefficient),
        ),
        ("Используемое топливо", Text(|v| &mut v.specs.engine.fuel_used)),
        ("Тип двигателя", Text(|v| &mut v.specs.engine.engine_type)),
        (
            "Максимальная мощность, л.с. (кВт) при об./мин.",
            LeadingDecimal(|v| &mut v.specs.engine.max_power),
        ),
        (
            "Максимальный крутящий момент, Н*м (кг*м) при об./мин.",
            Text(|v| &mut v.specs.engine.max_torque),
        ),
        ("Расход топлива в городском цикле, л/100 км", Decimal(|v| &mut v.specs.city_fuel_consumption)),
        ("Расход топлива за городом, л/100 км", Decimal(|v| &mut v.specs.highway_fuel_consumption)),
        (
            "Расход топлива в смешанном цикле, л/100 км",
            Decimal(|v| &mut v.specs.mixed_fuel_consumption),
        ),
        (
            "Гидроусилитель руля",
            Marked { value: "Гидроусилитель", target: |v| &mut v.specs.steering.power_steering },
        ),
        (
            "Электроусилитель руля",
            Marked { value: "Электроусилитель", target: |v| &mut v.specs.steering.power_steering },
        ),
        ("Передний стабилизатор", Toggle(|v| &mut v.specs.suspension.front_stabilizer)),
        ("Передняя подвеска", Text(|v| &mut v.specs.suspension.front_suspension)),
        ("Задний стабилизатор", Toggle(|v| &mut v.specs.suspension.back_stabilizer)),
        ("Задняя подвеска", Text(|v| &mut v.specs.suspension.back_suspension)),
        ("Передние колеса", Tire(|v| &mut v.specs.tires.front)),
        ("Задние колеса", Tire(|v| &mut v.specs.tires.back)),
        ("Передние тормоза", Text(|v| &mut v.specs.brakes.front_brakes)),
        ("Задние тормоза", Text(|v| &mut v.specs.brakes.back_brakes)),
        ("Стояночный тормоз", Text(|v| &mut v.specs.brakes.parking_brake)),
        (
            "Галогенные фары",
            Marked { value: "Галогенные фары", target: |v| &mut v.features.lights.headlights },
        ),
        (
            "Биксеноновые фары",
            Marked { value: "Биксеноновые фары", target: |v| &mut v.features.lights.headlights },
        ),
        (
            "Светодиодные фары",
            Marked { value: "Светодиодные фары", target: |v| &mut v.features.lights.headlights },
        ),
        (
            "Лазерные фары",
            Marked { value: "Лазерные фары", target: |v| &mut v.features.lights.headlights },
        ),
        ("Светодиодные ходовые огни", Toggle(|v| &mut v.features.lights.led_running_lights)),
        ("Передние противотуманные фары", Toggle(|v| &mut v.features.lights.front_fog_lights)),
        ("Светодиодные противотуманные фары", Toggle(|v| &mut v.features.lights.front_fog_lights)),
        ("Светодиодные задние фонари", Toggle(|v| &mut v.features.lights.led_tail_lights)),
        ("Задние противотуманные фонари", Toggle(|v| &mut v.features.lights.back_fog_lights)),
        ("Датчик света", Toggle(|v| &mut v.features.lights.light_sensor)),
        ("Датчик дождя", Toggle(|v| &mut v.features.electric.rain_sensor)),
        ("Электропривод боковых зеркал", Toggle(|v| &mut v.features.electric.side_mirror_drive)),
        ("Электроподогрев зеркал", Toggle(|v| &mut v.features.electric.side_mirror_heating)),
        ("Электропривод багажника", Toggle(|v| &mut v.features.electric.trunk_opener)),
        ("Обогрев заднего стекла", Toggle(|v| &mut v.features.electric.rear_window_heating)),
        (
            "Тканевая обивка салона",
            Marked { value: "Тканевая", target: |v| &mut v.features.interior.upholstery },
        ),
        (
            "Кожаная обивка салона",
            Marked { value: "Кожаная", target: |v| &mut v.features.interior.upholstery },
        ),
        (
            "Комбинированная обивка салона",
            Marked { value: "Комбинированная", target: |v| &mut v.features.interior.upholstery },
        ),
        ("Электропривод водительского сиденья", Toggle(|v| &mut v.features.electric.driver_seat_drive)),
        ("Электропривод передних сидений", Toggle(|v| &mut v.features.electric.front_seats_drive)),
        ("Электроподогрев передних сидений", Toggle(|v| &mut v.features.electric.front_seats_heating)),
        ("Электроподогрев задних сидений", Toggle(|v| &mut v.features.electric.back_seats_heating)),
        (
            "Электрические стеклоподъемники передние",
            Toggle(|v| &mut v.features.electric.front_window_lifts),
        ),
        (
            "Электрические стеклоподъемники задние",
            Toggle(|v| &mut v.features.electric.back_window_lifts),
        ),
        ("Электроподогрев рулевого колеса", Toggle(|v| &mut v.features.electric.steering_wheel_heating)),
        ("Электроподогрев лобового стекла", Toggle(|v| &mut v.features.electric.windshield_heating)),
        ("Подушка безопасности водительская", Toggle(|v| &mut v.features.airbags.driver)),
        (
            "Подушка безопасности переднего пассажира",
            Toggle(|v| &mut v.features.airbags.front_passenger),
        ),
        ("Подушка безопасности боковая", Toggle(|v| &mut v.features.airbags.side)),
        ("Подушки безопасности-шторки", Toggle(|v| &mut v.features.airbags.curtain)),
        ("Антиблокировочная система (ABS)", Toggle(|v| &mut v.features.safety.abs)),
        ("Система распределения тормозного усилия (EBD)", Toggle(|v| &mut v.features.safety.ebd)),
        ("Вспомогательная система торможения (BAS)", Toggle(|v| &mut v.features.safety.bas)),
        ("Система электронного контроля устойчивости (ESP)", Toggle(|v| &mut v.features.safety.esp)),
        ("Антипробуксовочная система (TCS)", Toggle(|v| &mut v.features.safety.tcs)),
        ("Круиз-контроль", Toggle(|v| &mut v.features.safety.cruise_control)),
        ("Передний парктроник", Toggle(|v| &mut v.features.safety.front_parking_sensor)),
        ("Задний парктроник", Toggle(|v| &mut v.features.safety.back_parking_sensor)),
        ("Камера заднего обзора", Toggle(|v| &mut v.features.safety.rear_view_camera)),
        ("Кондиционер", Toggle(|v| &mut v.features.climate.air_conditioner)),
        ("Климат-контроль", Toggle(|v| &mut v.features.climate.climate_control)),
        ("Поддержка MP3", Toggle(|v| &mut v.features.multimedia.mp3_support)),
        ("Hands free", Toggle(|v| &mut v.features.multimedia.hands_free)),
        ("Бортовой компьютер", Toggle(|v| &mut v.features.multimedia.on_board_computer)),
        ("Сигнализация", Toggle(|v| &mut v.features.alarm)),
    ];

    entries.into_iter().collect()
});

/// Applies a trim page's fields to a vehicle.
pub struct TrimParser {
    cell: Selector,
    icon_use: Selector,
    span: Selector,
}

impl TrimParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            cell: compile("td")?,
            icon_use: compile("use")?,
            span: compile("span")?,
        })
    }

    /// Scans all table cells and applies every recognized label's rule.
    ///
    /// Takes ownership of the vehicle and returns the updated record; on
    /// failure the error carries every field-tagged parse failure.
    pub fn apply(&self, document: &Html, mut vehicle: Vehicle) -> Result<Vehicle, AggregateParseError> {
        let mut failures: Vec<FieldFailure> = Vec::new();

        for cell in document.select(&self.cell) {
            let label_text = element_text(cell);
            let Some((&label, rule)) = RULES.get_key_value(label_text.trim()) else {
                continue;
            };

            match rule {
                CellRule::Text(target) => {
                    if let Some(value) = self.value_text(cell) {
                        *target(&mut vehicle) = value;
                    }
                }
                CellRule::TextIfEmpty(target) => {
                    if let Some(value) = self.value_text(cell) {
                        let field = target(&mut vehicle);
                        if field.is_empty() {
                            *field = value;
                        }
                    }
                }
                CellRule::Decimal(target) => {
                    if let Some(value) = self.value_text(cell) {
                        match parse_decimal(&value) {
                            Ok(number) => *target(&mut vehicle) = number,
                            Err(reason) => failures.push(FieldFailure::new(label, reason)),
                        }
                    }
                }
                CellRule::Count(target) => {
                    if let Some(value) = self.value_text(cell) {
                        match value.parse::<u32>() {
                            Ok(number) => *target(&mut vehicle) = number,
                            Err(e) => failures.push(FieldFailure::new(label, e.to_string())),
                        }
                    }
                }
                CellRule::LeadingDecimal(target) => {
                    if let Some(value) = self.value_text(cell) {
                        match LEADING_DIGITS_RE.find(&value) {
                            Some(m) => match parse_decimal(m.as_str()) {
                                Ok(number) => *target(&mut vehicle) = number,
                                Err(reason) => failures.push(FieldFailure::new(label, reason)),
                            },
                            None => failures.push(FieldFailure::new(
                                label,
                                format!("no leading digit run in '{value}'"),
                            )),
                        }
                    }
                }
                CellRule::BodyDimensions => {
                    if let Some(value) = self.value_text(cell) {
                        self.apply_dimensions(&value, label, &mut vehicle, &mut failures);
                    }
                }
                CellRule::Tire(target) => {
                    if let Some(value) = self.value_text(cell) {
                        self.apply_tire(&value, label, target(&mut vehicle), &mut failures);
                    }
                }
                CellRule::Toggle(target) => {
                    *target(&mut vehicle) = self.availability_of(cell);
                }
                CellRule::Marked { value, target } => {
                    if self.value_cell_has_icon(cell, CHECK_MARK) {
                        *target(&mut vehicle) = (*value).to_string();
                    }
                }
            }
        }

        if failures.is_empty() {
            Ok(vehicle)
        } else {
            debug!(count = failures.len(), "trim page had field parse failures");
            Err(AggregateParseError::new(failures))
        }
    }

    /// Trimmed text of the cell adjacent to a label cell.
    fn value_text(&self, label_cell: ElementRef<'_>) -> Option<String> {
        next_element(label_cell).map(|cell| element_text(cell).trim().to_string())
    }

    fn apply_dimensions(
        &self,
        value: &str,
        label: &'static str,
        vehicle: &mut Vehicle,
        failures: &mut Vec<FieldFailure>,
    ) {
        let runs: Vec<&str> = DIGIT_RUNS_RE.find_iter(value).map(|m| m.as_str()).collect();
        match runs.as_slice() {
            [] => {}
            [length, width, height, ..] => {
                let targets: [(&str, DecimalField); 3] = [
                    (*length, |v| &mut v.specs.length),
                    (*width, |v| &mut v.specs.width),
                    (*height, |v| &mut v.specs.height),
                ];
                for (run, target) in targets {
                    match parse_decimal(run) {
                        Ok(number) => *target(vehicle) = number,
                        Err(reason) => failures.push(FieldFailure::new(label, reason)),
                    }
                }
            }
            _ => failures.push(FieldFailure::new(
                label,
                format!("expected three digit runs in '{value}'"),
            )),
        }
    }

    fn apply_tire(
        &self,
        value: &str,
        label: &'static str,
        tire: &mut TireSize,
        failures: &mut Vec<FieldFailure>,
    ) {
        // A cell without the tire notation at all is silently skipped.
        let Some(m) = TIRE_RE.find(value) else {
            return;
        };
        let notation = m.as_str();

        let parts: [(&Regex, &mut u32, &str); 3] = [
            (&TIRE_WIDTH_RE, &mut tire.width, "width"),
            (&TIRE_ASPECT_RE, &mut tire.aspect_ratio, "aspect ratio"),
            (&TIRE_RIM_RE, &mut tire.rim_diameter, "rim diameter"),
        ];
        for (pattern, target, part) in parts {
            if let Some(digits) = pattern.captures(notation).and_then(|c| c.get(1)) {
                match digits.as_str().parse::<u32>() {
                    Ok(number) => *target = number,
                    Err(e) => {
                        failures.push(FieldFailure::new(label, format!("{part}: {e}")));
                    }
                }
            }
        }
    }

    /// Tri-state marker: a checkmark icon in the label's row means `Yes`, an
    /// option icon means `Option`, a "—" placeholder in the adjacent cell
    /// means `No`; none of these leaves `Unknown`.
    fn availability_of(&self, label_cell: ElementRef<'_>) -> Availability {
        let mut state = Availability::Unknown;

        if let Some(row) = parent_element(label_cell) {
            for icon in row.select(&self.icon_use) {
                match icon.value().attr("href") {
                    Some(CHECK_MARK) => state = Availability::Yes,
                    Some(OPTION_MARK) => state = Availability::Option,
                    _ => {}
                }
            }
        }

        if let Some(value_cell) = next_element(label_cell) {
            let spans: String = value_cell.select(&self.span).map(element_text).collect();
            if spans.trim() == NO_PLACEHOLDER {
                state = Availability::No;
            }
        }

        state
    }

    fn value_cell_has_icon(&self, label_cell: ElementRef<'_>, icon: &str) -> bool {
        next_element(label_cell)
            .map(|cell| {
                cell.select(&self.icon_use)
                    .any(|u| u.value().attr("href") == Some(icon))
            })
            .unwrap_or(false)
    }
}

/// Parses a decimal number, normalizing a decimal comma to a decimal point.
fn parse_decimal(text: &str) -> Result<f64, String> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|e| format!("'{}': {e}", text.trim()))
}

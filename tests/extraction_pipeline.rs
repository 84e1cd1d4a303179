//! End-to-end pipeline tests over canned HTML pages.
//!
//! Three ads cover the trim-stage state machine: a direct complectation
//! link, a generation page that resolves to a trim, and a generation page
//! where no candidate covers the vehicle's quick specs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use motorscout::application::{ExtractionOrchestrator, ListingRequest};
use motorscout::domain::vehicle::{Availability, SteeringPosition};
use motorscout::infrastructure::config::CrawlerConfig;
use motorscout::infrastructure::http_client::{FetchError, PageFetcher};
use motorscout::infrastructure::parsing::SiteProfile;

struct StubFetcher {
    pages: HashMap<String, String>,
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Parse {
            url: url.to_string(),
            reason: "no such page".to_string(),
        })
    }
}

fn listing_page() -> String {
    r#"<html><body>
      <div data-bulletin-list="true">
        <a href="http://ads.test/direct">
          <span data-ftid="bull_title">Kia Rio 1.6 2018</span>
          <span data-ftid="bull_price">899000</span>
        </a>
        <a href="http://ads.test/generation">
          <span data-ftid="bull_title">Toyota Camry 2.5 2019</span>
          <span data-ftid="bull_price">1250000</span>
        </a>
        <a href="http://ads.test/unresolved">
          <span data-ftid="bull_title">Honda Fit, 2017</span>
          <span data-ftid="bull_price">780000</span>
        </a>
      </div>
    </body></html>"#
        .to_string()
}

/// Detail page with a direct complectation link.
fn direct_detail_page() -> String {
    r#"<html><body>
      <span class="css-1kb7l9z e162wx9x0">Kia Rio</span>
      <span class="css-1kb7l9z e162wx9x0">Один владелец, обслуживание у дилера.</span>
      <div data-ftid="bull-page_bull-gallery_thumbnails">
        <a href="http://img.test/rio-1.jpg"></a>
        <a href="http://img.test/rio-2.png"></a>
        <a href="http://img.test/clip.mp4"></a>
      </div>
      <span class="css-1jygg09 e162wx9x0">бензин, 1.6 л</span>
      <table>
        <tr><td>Мощность</td><td class="css-1la7f7n ezjvm5n0">123 л.с., налог 4 305 ₽</td></tr>
        <tr><td>Коробка передач</td><td class="css-1la7f7n ezjvm5n0">автомат</td></tr>
        <tr><td>Привод</td><td class="css-1la7f7n ezjvm5n0">передний</td></tr>
        <tr><td>Тип кузова</td><td class="css-1la7f7n ezjvm5n0">седан</td></tr>
        <tr><td>Цвет</td><td class="css-1la7f7n ezjvm5n0">белый</td></tr>
        <tr><td>Руль</td><td class="css-1la7f7n ezjvm5n0">левый</td></tr>
        <tr><td>Комплектация</td>
          <td class="css-1la7f7n ezjvm5n0"><a href="http://catalog.test/kia-rio-luxe">Luxe</a></td></tr>
      </table>
      <span class="css-1osyw3j ei6iaw00">35 000 км</span>
    </body></html>"#
        .to_string()
}

/// Detail page with a generation link and no complectation link.
fn generation_detail_page() -> String {
    r#"<html><body>
      <span class="css-1jygg09 e162wx9x0">бензин, 2.5 л</span>
      <table>
        <tr><td>Мощность</td><td class="css-1la7f7n ezjvm5n0">181 л.с.</td></tr>
        <tr><td>Коробка передач</td><td class="css-1la7f7n ezjvm5n0">автомат</td></tr>
        <tr><td>Привод</td><td class="css-1la7f7n ezjvm5n0">передний</td></tr>
        <tr><td>Цвет</td><td class="css-1la7f7n ezjvm5n0">чёрный</td></tr>
      </table>
      <span class="css-ytyb35 e162wx9x0">новый автомобиль</span>
      <a href="http://gen.test/camry-xv70" data-ga-stats-name="generation_link">Camry XV70</a>
    </body></html>"#
        .to_string()
}

/// Detail page whose generation page has no covering candidate.
fn unresolved_detail_page() -> String {
    r#"<html><body>
      <span class="css-1jygg09 e162wx9x0">бензин, 1.5 л</span>
      <table>
        <tr><td>Мощность</td><td class="css-1la7f7n ezjvm5n0">130 л.с.</td></tr>
        <tr><td>Коробка передач</td><td class="css-1la7f7n ezjvm5n0">вариатор</td></tr>
        <tr><td>Привод</td><td class="css-1la7f7n ezjvm5n0">передний</td></tr>
        <tr><td>Цвет</td><td class="css-1la7f7n ezjvm5n0">синий</td></tr>
      </table>
      <span class="css-1osyw3j ei6iaw00">88 000 км</span>
      <a href="http://gen.test/fit-ge" data-ga-stats-name="generation_link">Fit GE</a>
    </body></html>"#
        .to_string()
}

/// Generation page where the second candidate covers the Camry's specs.
fn camry_generation_page() -> String {
    r#"<html><body><table>
      <tr><th colspan="7">2.0 л, 150 л.с., бензин, АКПП, передний привод</th></tr>
      <tr><td><a href="/catalog/toyota/camry/100/">Подробнее</a></td></tr>
      <tr><th colspan="7">2.5 л, 181 л.с., бензин, АКПП, передний привод</th></tr>
      <tr><td><a href="/catalog/toyota/camry/200/">Подробнее</a></td></tr>
    </table></body></html>"#
        .to_string()
}

/// Generation page listing only diesel candidates.
fn fit_generation_page() -> String {
    r#"<html><body><table>
      <tr><th colspan="6">1.6 л, 110 л.с., дизель, МКПП, передний привод</th></tr>
      <tr><td><a href="/catalog/honda/fit/300/">Подробнее</a></td></tr>
    </table></body></html>"#
        .to_string()
}

fn rio_trim_page() -> String {
    r##"<html><body><table>
      <tr><td>Название комплектации</td><td>1.6 AT Luxe</td></tr>
      <tr><td>Тип трансмиссии</td><td>АКПП</td></tr>
      <tr><td>Тип кузова</td><td>лифтбек</td></tr>
      <tr><td>Объем двигателя, куб.см</td><td>1591</td></tr>
      <tr><td>Масса, кг</td><td>1160</td></tr>
      <tr><td>Габариты кузова (Д x Ш x В), мм</td><td>4400x1740x1470</td></tr>
      <tr><td>Передние колеса</td><td>195/55 R16</td></tr>
      <tr><td>Расход топлива в смешанном цикле, л/100 км</td><td>6,6</td></tr>
      <tr><td>Кондиционер</td><td><svg><use href="#yes"></use></svg></td></tr>
      <tr><td>Круиз-контроль</td><td><span>—</span></td></tr>
    </table></body></html>"##
        .to_string()
}

fn camry_trim_page() -> String {
    r##"<html><body><table>
      <tr><td>Название комплектации</td><td>2.5 AT Элеганс</td></tr>
      <tr><td>Максимальная мощность, л.с. (кВт) при об./мин.</td><td>181 (133) при 6000</td></tr>
      <tr><td>Масса, кг</td><td>1550</td></tr>
      <tr><td>Задние колеса</td><td>215/55 R17</td></tr>
      <tr><td>Климат-контроль</td><td><svg><use href="#option"></use></svg></td></tr>
    </table></body></html>"##
        .to_string()
}

fn stub() -> StubFetcher {
    let pages: HashMap<String, String> = [
        ("http://listing.test/".to_string(), listing_page()),
        ("http://ads.test/direct".to_string(), direct_detail_page()),
        ("http://ads.test/generation".to_string(), generation_detail_page()),
        ("http://ads.test/unresolved".to_string(), unresolved_detail_page()),
        ("http://gen.test/camry-xv70".to_string(), camry_generation_page()),
        ("http://gen.test/fit-ge".to_string(), fit_generation_page()),
        ("http://catalog.test/kia-rio-luxe".to_string(), rio_trim_page()),
        (
            "https://www.drom.ru/catalog/toyota/camry/200/".to_string(),
            camry_trim_page(),
        ),
    ]
    .into_iter()
    .collect();
    StubFetcher { pages }
}

fn orchestrator() -> ExtractionOrchestrator<StubFetcher> {
    ExtractionOrchestrator::new(
        Arc::new(stub()),
        &SiteProfile::default(),
        CrawlerConfig::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn full_pipeline_extracts_all_three_state_machine_paths() {
    let report = orchestrator()
        .extract(&[ListingRequest::new("http://listing.test/", 10)])
        .await
        .unwrap();

    assert!(report.failures.is_empty(), "failures: {:?}", report.failures);
    assert!(!report.cancelled);
    assert_eq!(report.vehicles.len(), 3);

    // Collector order and dense ids.
    assert_eq!(report.vehicles[0].full_name, "Kia Rio 1.6 2018");
    assert_eq!(report.vehicles[1].full_name, "Toyota Camry 2.5 2019");
    assert_eq!(report.vehicles[2].full_name, "Honda Fit, 2017");
    for (i, vehicle) in report.vehicles.iter().enumerate() {
        assert_eq!(vehicle.id, i);
    }
}

#[tokio::test]
async fn direct_trim_link_vehicle_is_fully_populated() {
    let report = orchestrator()
        .extract(&[ListingRequest::new("http://listing.test/", 10)])
        .await
        .unwrap();
    let rio = &report.vehicles[0];

    // Detail-level fields.
    assert_eq!(rio.offering.year, 2018);
    assert_eq!(rio.offering.price, "899 000 ₽");
    assert_eq!(rio.offering.kilometerage, "35 000 км");
    assert_eq!(rio.description, "Один владелец, обслуживание у дилера.");
    assert_eq!(
        rio.offering.photo_urls,
        vec!["http://img.test/rio-1.jpg", "http://img.test/rio-2.png"]
    );
    assert_eq!(rio.features.color, "белый");
    assert_eq!(rio.specs.steering.position, SteeringPosition::Left);

    // Trim-level fields.
    assert_eq!(rio.trim_level, "1.6 AT Luxe");
    assert_eq!(rio.specs.gearbox, "АКПП");
    assert_eq!(rio.specs.engine.capacity, 1591.0);
    assert_eq!(rio.specs.mass, 1160.0);
    assert_eq!(rio.specs.length, 4400.0);
    assert_eq!(rio.specs.width, 1740.0);
    assert_eq!(rio.specs.height, 1470.0);
    assert_eq!(rio.specs.tires.front.width, 195);
    assert_eq!(rio.specs.tires.front.aspect_ratio, 55);
    assert_eq!(rio.specs.tires.front.rim_diameter, 16);
    assert_eq!(rio.specs.mixed_fuel_consumption, 6.6);
    assert_eq!(rio.features.climate.air_conditioner, Availability::Yes);
    assert_eq!(rio.features.safety.cruise_control, Availability::No);
    // Unseen icon field stays unknown, distinct from the explicit "—".
    assert_eq!(rio.features.safety.abs, Availability::Unknown);

    // The detail page's body type wins over the trim page's.
    assert_eq!(rio.specs.body, "седан");
}

#[tokio::test]
async fn generation_link_vehicle_resolves_to_matching_trim() {
    let report = orchestrator()
        .extract(&[ListingRequest::new("http://listing.test/", 10)])
        .await
        .unwrap();
    let camry = &report.vehicles[1];

    assert_eq!(camry.generation, "Camry XV70");
    // The new-vehicle marker replaced the empty odometer value.
    assert_eq!(camry.offering.kilometerage, "новый автомобиль");

    // Fields from the trim page the resolver picked (the 2.5 candidate, not
    // the first one).
    assert_eq!(camry.trim_level, "2.5 AT Элеганс");
    assert_eq!(camry.specs.engine.max_power, 181.0);
    assert_eq!(camry.specs.mass, 1550.0);
    assert_eq!(camry.specs.tires.back.width, 215);
    assert_eq!(camry.features.climate.climate_control, Availability::Option);
}

#[tokio::test]
async fn unresolved_generation_keeps_partial_vehicle() {
    let report = orchestrator()
        .extract(&[ListingRequest::new("http://listing.test/", 10)])
        .await
        .unwrap();
    let fit = &report.vehicles[2];

    // Detail-level fields survive.
    assert_eq!(fit.offering.year, 2017);
    assert_eq!(fit.features.color, "синий");
    assert_eq!(fit.generation, "Fit GE");

    // No trim page was applied.
    assert_eq!(fit.trim_level, "");
    assert_eq!(fit.specs.mass, 0.0);
    assert_eq!(fit.features.climate.air_conditioner, Availability::Unknown);
}

#[tokio::test]
async fn limit_bounds_the_number_of_extracted_vehicles() {
    let report = orchestrator()
        .extract(&[ListingRequest::new("http://listing.test/", 2)])
        .await
        .unwrap();
    assert_eq!(report.vehicles.len(), 2);
    assert_eq!(report.vehicles[1].full_name, "Toyota Camry 2.5 2019");
}

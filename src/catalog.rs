// Curated product catalogs
// The vendor search drops products for some country/class combinations, so these
// tables hold the product codes each combination is expected to return.

use crate::types::ProductType;
use serde::Serialize;

type CatalogEntry = (&'static str, &'static [&'static str]);

// Group tours by "{country}-{class}"
pub static GROUP_TOURS_CATALOG: &[CatalogEntry] = &[
    (
        "kenya-deluxe",
        &[
            "NBOGTARP001CKEKEE",
            "NBOGTARP001CKSE",
            "NBOGTARP001EAEKE",
            "NBOGTARP001THRKE3",
            "NBOGTARP001THRSE3",
        ],
    ),
    ("kenya-deluxe-plus", &["NBOGTARP001EAESE"]),
    ("kenya-basic", &["NBOGTARP001CKSM", "NBOGTARP001THRSM3"]),
    (
        "kenya-standard",
        &[
            "NBOGTARP001CKSO",
            "NBOGTARP001THRSO3",
            "NBOGTSOAEASKTNM21",
            "NBOGTSOAEASSNM022",
            "NBOGTSOAEASSNM031",
            "NBOGTSOAEASSNM041",
            "NBOGTSOAEASSNM061",
            "NBOGTSOAEASSNM062",
            "NBOGTSOAEASSNM071",
            "NBOGTSOAEASSNM091",
            "NBOGTSOAEASSNM111",
            "NBOGTSOAEASSNM131",
        ],
    ),
    ("botswana-basic", &["MUBGTSUNWAYSUNA13"]),
    ("botswana-deluxe", &["MUBGTJENMANJENBSE"]),
    ("botswana-overland-camping", &["MUBGTSUNWAYSUBT13"]),
    ("namibia-deluxe", &["WDHGTSOANAMCAPNAM"]),
    (
        "namibia-deluxe-plus",
        &["WDHGTULTSAFULTNAM", "WDHGTSOANAMEXNASP"],
    ),
    ("namibia-standard", &["WDHGTSOANAMHINAMC"]),
    (
        "south-africa-basic",
        &[
            "CPTGTNOMAD NOMNAM",
            "CPTGTSUNWAYCWA13",
            "CPTGTSUNWAYSUNA21",
            "DURGTNOMAD NADC",
            "JNBGTSUNWAYSAA17",
            "JNBGTNOMAD NAJC",
            "JNBGTNOMAD NAJD",
            "JNBGTNOMAD NAJP",
            "JNBGTSUNWAYSUNA14",
            "JNBGTSUNWAYSUNZBA",
            "CPTGTSATOURSAGRD4",
        ],
    ),
    (
        "south-africa-overland-camping",
        &[
            "CPTGTSUNWAYSUCV21",
            "CPTGTSUNWAYSUCW14",
            "DURGTNOMAD NDC",
            "JNBGTSUNWAYSUBT14",
            "JNBGTNOMAD NJP",
            "JNBGTNOMAD NJD",
            "JNBGTNOMAD NJC",
            "PLZGTNOMAD NPC",
        ],
    ),
    (
        "south-africa-standard",
        &[
            "CPTGTSATOURSAGRD4",
            "JNBGTNOMAD NAJCSG",
            "JNBGTNOMAD NAJPSG",
            "JNBGTSATOURSAJOUR",
            "PLZGTNOMAD NAPCSG",
            "PLZGTTVT001TISD20",
            "PLZGTTVT001TISG20",
        ],
    ),
    ("tanzania-deluxe", &["JROGTARP001SIMSE7"]),
    ("tanzania-luxury", &["JROGTARP001SIMWEP"]),
    (
        "tanzania-standard",
        &["JROGTARP001SIMTW7", "JROGTSOAEASSNM024", "JROGTSOAEASSNM042"],
    ),
    ("zambia-basic", &["LVIGTSUNWAYNBA15", "LVIGTSUNWAYSUNNBA"]),
    (
        "zambia-overland-camping",
        &["LVIGTSUNWAYSUNB15", "LVIGTSUNWAYSUNB21"],
    ),
    ("zimbabwe-basic", &["VFAGTNOMAD NAZZ"]),
    (
        "zimbabwe-standard",
        &["VFAGTJENMANJENW15", "VFAGTJENMANJENW12"],
    ),
];

// Packages by "{country}-{class}"
pub static PACKAGES_CATALOG: &[CatalogEntry] = &[
    (
        "botswana-deluxe",
        &[
            "BBKPKCHO0153NIGPA",
            "BBKPKCHO015BUSDEL",
            "BBKPKTVT001BOD6KM",
            "BBKPKTVT001CGLCOK",
        ],
    ),
    ("botswana-luxury", &["BBKPKCHO015STDBUS", "BBKPKCPKUZ CPKU2N"]),
    (
        "botswana-standard",
        &[
            "BBKPKCHO004CHOLUX",
            "BBKPKCHO004CHOLWA",
            "BBKPKCHOBAKBAK3DP",
            "BBKPKCHOBAKBAK4DP",
        ],
    ),
    ("kenya-basic", &["NBOPKARP001CKSNPK"]),
    (
        "kenya-deluxe",
        &[
            "NBOPKARP001ENCHAN",
            "NBOPKARP001FIMSER",
            "NBOPKARP001WDD",
            "NBOPKTHISSAWLWFPC",
        ],
    ),
    (
        "kenya-luxury",
        &["NBOPKARP001FIMMGV", "NBOPKARP001FIMMKT", "NBOPKARP001FIMMLG"],
    ),
    ("rwanda-basic", &["KGLPKAASAFAGERB", "KGLPKAASAFAGEUB"]),
    ("rwanda-deluxe", &["KGLPKAASAFAGEUD", "KGLPKARP001GERWDX"]),
    (
        "rwanda-standard",
        &[
            "KGLPKAASAFAAAGMST",
            "KGLPKAASAFAAAPPST",
            "KGLPKAASAFAGERS",
            "KGLPKAASAFAGEUS",
            "KGLPKTHISSAGGAME",
        ],
    ),
    (
        "south-africa-deluxe",
        &[
            "CPTPKTHISSACPGRKA",
            "CPTPKTHISSASCENDX",
            "CPTPKTHISSASDCRDX",
            "CPTPKTVT001CTCLCM",
            "CPTPKTVT001CTCLPW",
            "CPTPKTVT001CTCLRB",
            "CPTPKTVT001CTCLSS",
            "CPTPKTVT001CTCLVL",
            "CPTPKTVT001CTERRB",
            "CPTPKTVT001CTERSS",
            "CPTPKTVT001CTERVL",
            "CPTPKTVT001CTEXCM",
            "CPTPKTVT001CTEXPW",
            "CPTPKTVT001CTEXRB",
            "CPTPKTVT001CTEXSS",
            "CPTPKTVT001CTEXVL",
            "CPTPKTVT001CTRCO",
            "GKPPKTVT001KREDEL",
            "JNBPKTHISSAHOSADE",
        ],
    ),
    (
        "south-africa-standard",
        &[
            "CPTPKTHISSAGRANDS",
            "CPTPKTHISSASCENST",
            "CPTPKTHISSASDCGST",
            "CPTPKTVT001CTCLHO",
            "CPTPKTVT001CTERHO",
            "CPTPKTVT001CTERPW",
            "CPTPKTVT001CTEXHO",
            "HDSPKMAKUTSMSSCLA",
            "HDSPKMAKUTSMSSWLK",
            "JNBPKTHISSASPLEN1",
            "JNBPKTHISSASPLEN2",
        ],
    ),
    (
        "south-africa-luxury",
        &[
            "CPTPKTHISSASCENLX",
            "CPTPKTHISSASDCGLX",
            "CPTPKTVT001CTCLTB",
            "CPTPKTVT001CTCLVA",
            "CPTPKTVT001CTERTB",
            "CPTPKTVT001CTERVC",
            "CPTPKTVT001CTEXTB",
            "CPTPKTVT001CTEXVA",
            "GKPPKSABBLDSBL4P3",
        ],
    ),
    ("uganda-basic", &["EBBPKAASAFAGITMB"]),
    (
        "uganda-standard",
        &["EBBPKAASAFAAGITMS", "EBBPKARP001BAIRST"],
    ),
    ("uganda-deluxe", &["EBBPKARP001BAIRDX"]),
    ("zambia-standard", &["LVIPKTVT001FE2NAV"]),
    ("zambia-luxury", &["LVIPKTVT001FE2NRL"]),
    (
        "zimbabwe-deluxe",
        &[
            "VFAPKTHISSAVFCHD2",
            "VFAPKTHISSAVFCHO2",
            "VFAPKTHISSAVFCHO6",
            "VFAPKTHISSAVFCRU1",
            "VFAPKTHISSAVFCRU2",
            "VFAPKTHISSAZAMDR1",
            "VFAPKTHISSAZAMDR2",
            "VFAPKTVT001FC3NT1",
            "VFAPKTVT001FC3NT3",
            "VFAPKTVT001FC3NT5",
            "VFAPKTVT001FE2NSL",
            "VFAPKTVT001FE2NT3",
            "VFAPKTVT001FE3NT2",
            "VFAPKTVT001FE3NT3",
            "VFAPKTVT001FE3NT6",
            "VFAPKTVT001FSD2NW",
            "VFAPKTVT001FSD3NS",
            "VFAPKTVT001FSD3NW",
            "VFAPKTVT001FSD3WS",
        ],
    ),
    (
        "zimbabwe-standard",
        &[
            "VFAPKTHISSAVFCH01",
            "VFAPKTHISSAVFCHD1",
            "VFAPKTHISSAVFCHO5",
            "VFAPKTVT001FC3NT2",
            "VFAPKTVT001FE2NT1",
        ],
    ),
    (
        "zimbabwe-luxury",
        &[
            "VFAPKTHISSAVFCHD4",
            "VFAPKTHISSAVFCHO7",
            "VFAPKTHISSAVFCRU3",
            "VFAPKTHISSAZAMDR3",
            "VFAPKTHISSAZAMDR4",
            "VFAPKTVT001FC3NT4",
            "VFAPKTVT001FC3NT6",
            "VFAPKTVT001FC3NT7",
            "VFAPKTVT001FE2NT4",
            "VFAPKTVT001FE2NT8",
            "VFAPKTVT001FE3NT5",
            "VFAPKTVT001FE3NT7",
            "VFAPKTVT001FE3NT8",
            "VFAPKTVT001FSD3CL",
            "VFAPKTVT001FSD3CS",
        ],
    ),
];

pub static RAIL_PRODUCT_CODES: &[&str] = &[
    "VFARLROV001VFPRDX",
    "VFARLROV001VFPRRY",
    "VFARLROV001VFPYPM",
    "CPTRLROV001RRCTPR",
    "CPTRLROV001CTPPUL",
    "CPTRLROV001CTPRRO",
    "PRYRLROV001ROV004",
    "PRYRLROV001PRCPRY",
    "PRYRLROV001PRCPPM",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CruiseProduct {
    pub product_code: &'static str,
    pub name: &'static str,
    pub regions: &'static [&'static str],
    pub description: &'static str,
}

const ZAMBEZI_REGIONS: &[&str] = &["botswana", "namibia", "zimbabwe"];
const CHOBE_REGIONS: &[&str] = &["botswana"];

pub static CRUISE_PRODUCTS: &[CruiseProduct] = &[
    CruiseProduct {
        product_code: "BBKCRTVT001ZAM2NS",
        name: "Zambezi Queen 2-night Standard",
        regions: ZAMBEZI_REGIONS,
        description: "Zambezi Queen river cruise - 2 nights standard accommodation",
    },
    CruiseProduct {
        product_code: "BBKCRTVT001ZAM2NM",
        name: "Zambezi Queen 2-night Master",
        regions: ZAMBEZI_REGIONS,
        description: "Zambezi Queen river cruise - 2 nights master suite",
    },
    CruiseProduct {
        product_code: "BBKCRTVT001ZAM3NS",
        name: "Zambezi Queen 3-night Standard",
        regions: ZAMBEZI_REGIONS,
        description: "Zambezi Queen river cruise - 3 nights standard accommodation",
    },
    CruiseProduct {
        product_code: "BBKCRTVT001ZAM3NM",
        name: "Zambezi Queen 3-night Master",
        regions: ZAMBEZI_REGIONS,
        description: "Zambezi Queen river cruise - 3 nights master suite",
    },
    CruiseProduct {
        product_code: "BBKCRCHO018TIACP2",
        name: "Chobe Princess 2-night",
        regions: CHOBE_REGIONS,
        description: "Chobe Princess river cruise - 2 nights",
    },
    CruiseProduct {
        product_code: "BBKCRCHO018TIACP3",
        name: "Chobe Princess 3-night",
        regions: CHOBE_REGIONS,
        description: "Chobe Princess river cruise - 3 nights",
    },
];

/// Whether a rail or cruise product can be booked online, and on which weekday it departs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAvailability {
    pub product_code: &'static str,
    pub has_availability: bool,
    pub departure_days: &'static [&'static str],
    pub notes: &'static str,
}

pub static RAIL_AVAILABILITY: &[ProductAvailability] = &[
    ProductAvailability {
        product_code: "CPTRLROV001CTPRRO",
        has_availability: false,
        departure_days: &[],
        notes: "No availability data available - contact for quote",
    },
    ProductAvailability {
        product_code: "CPTRLROV001RRCTPR",
        has_availability: false,
        departure_days: &[],
        notes: "No availability data available - contact for quote",
    },
    ProductAvailability {
        product_code: "CPTRLROV001CTPPUL",
        has_availability: false,
        departure_days: &[],
        notes: "No availability data available - contact for quote",
    },
    ProductAvailability {
        product_code: "PRYRLROV001PRCPPM",
        has_availability: true,
        departure_days: &["Friday"],
        notes: "Available Fridays - can be booked online",
    },
    ProductAvailability {
        product_code: "PRYRLROV001PRCPRY",
        has_availability: true,
        departure_days: &["Friday"],
        notes: "Available Fridays - can be booked online",
    },
    ProductAvailability {
        product_code: "PRYRLROV001ROV004",
        has_availability: true,
        departure_days: &["Friday"],
        notes: "Available Fridays - can be booked online",
    },
];

pub static CRUISE_AVAILABILITY: &[ProductAvailability] = &[
    ProductAvailability {
        product_code: "BBKCRTVT001ZAM2NS",
        has_availability: false,
        departure_days: &[],
        notes: "Zambezi Queen 2-night standard - no availability, contact for quote",
    },
    ProductAvailability {
        product_code: "BBKCRTVT001ZAM2NM",
        has_availability: false,
        departure_days: &[],
        notes: "Zambezi Queen 2-night master - no availability, contact for quote",
    },
    ProductAvailability {
        product_code: "BBKCRTVT001ZAM3NS",
        has_availability: true,
        departure_days: &["Friday"],
        notes: "Zambezi Queen 3-night standard - available Fridays",
    },
    ProductAvailability {
        product_code: "BBKCRTVT001ZAM3NM",
        has_availability: true,
        departure_days: &["Friday"],
        notes: "Zambezi Queen 3-night master - available Fridays",
    },
    ProductAvailability {
        product_code: "BBKCRCHO018TIACP2",
        has_availability: true,
        departure_days: &["Monday", "Wednesday"],
        notes: "Chobe Princess 2-night - available Mondays and Wednesdays",
    },
    ProductAvailability {
        product_code: "BBKCRCHO018TIACP3",
        has_availability: true,
        departure_days: &["Friday"],
        notes: "Chobe Princess 3-night - available Fridays",
    },
];

/// Service segment embedded in a product code (characters 3..5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceKind {
    DayTour,
    GroupTour,
    Package,
    Cruise,
    Rail,
    Accommodation,
}

pub fn service_kind(code: &str) -> Option<ServiceKind> {
    match code.get(3..5)? {
        "DT" => Some(ServiceKind::DayTour),
        "GT" => Some(ServiceKind::GroupTour),
        "PK" => Some(ServiceKind::Package),
        "CR" => Some(ServiceKind::Cruise),
        "RL" => Some(ServiceKind::Rail),
        "AC" | "SP" => Some(ServiceKind::Accommodation),
        _ => None,
    }
}

pub fn normalize_class(class_filter: &str) -> String {
    class_filter
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .replace("deluxe+", "deluxe-plus")
}

pub fn catalog_key(country: &str, class_filter: &str) -> String {
    format!(
        "{}-{}",
        country.trim().to_lowercase(),
        normalize_class(class_filter)
    )
}

fn lookup(table: &'static [CatalogEntry], key: &str) -> Option<&'static [&'static str]> {
    table
        .iter()
        .find(|(entry_key, _)| *entry_key == key)
        .map(|(_, codes)| *codes)
}

/// Curated product codes for a country + class combination.
///
/// Packages use their own table; every other product type reads the group tours table.
pub fn country_class_products(
    country: &str,
    class_filter: &str,
    product_type: Option<ProductType>,
) -> Option<&'static [&'static str]> {
    let key = catalog_key(country, class_filter);
    match product_type {
        Some(ProductType::Packages) => lookup(PACKAGES_CATALOG, &key),
        _ => lookup(GROUP_TOURS_CATALOG, &key),
    }
}

pub fn cruise_products_for_region(country: &str) -> Vec<&'static CruiseProduct> {
    let country = country.trim().to_lowercase();
    CRUISE_PRODUCTS
        .iter()
        .filter(|p| p.regions.contains(&country.as_str()))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Region {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn cruise_regions() -> Vec<Region> {
    vec![
        Region {
            value: "botswana",
            label: "Botswana",
        },
        Region {
            value: "namibia",
            label: "Namibia",
        },
        Region {
            value: "zimbabwe",
            label: "Zimbabwe",
        },
    ]
}

// Only Botswana cruises are split by destination and class
pub fn shows_destination_and_class(country: &str) -> bool {
    country.trim().eq_ignore_ascii_case("botswana")
}

pub fn rail_product_codes() -> &'static [&'static str] {
    RAIL_PRODUCT_CODES
}

pub fn rail_availability(code: &str) -> Option<&'static ProductAvailability> {
    RAIL_AVAILABILITY.iter().find(|p| p.product_code == code)
}

pub fn cruise_availability(code: &str) -> Option<&'static ProductAvailability> {
    CRUISE_AVAILABILITY.iter().find(|p| p.product_code == code)
}

// Unconfigured rail products need a quote
pub fn rail_bookable(code: &str) -> bool {
    rail_availability(code).map_or(false, |p| p.has_availability)
}

// Unconfigured cruise products are assumed bookable
pub fn cruise_bookable(code: &str) -> bool {
    cruise_availability(code).map_or(true, |p| p.has_availability)
}

pub fn slug_to_title(value: &str) -> String {
    value
        .split(['-', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

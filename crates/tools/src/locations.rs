//! City codes the availability backend understands, and the names users
//! type for them.

use unicode_normalization::UnicodeNormalization;

/// (city code, ISO 3166-1 alpha-2 country)
const CITIES: &[(&str, &str)] = &[
    // Spain
    ("MAD", "ES"), ("BCN", "ES"), ("PMI", "ES"), ("MAL", "ES"), ("IBZ", "ES"),
    ("SEV", "ES"), ("VAL", "ES"), ("GRA", "ES"), ("BIL", "ES"),
    // France and Monaco
    ("PAR", "FR"), ("NIC", "FR"), ("CAN", "FR"), ("LYO", "FR"), ("MRS", "FR"),
    ("BOR", "FR"), ("STR", "FR"), ("MON", "MC"),
    // Italy
    ("ROM", "IT"), ("MIL", "IT"), ("VEN", "IT"), ("FLO", "IT"), ("NAP", "IT"),
    ("AMF", "IT"), ("CAP", "IT"),
    // Germany
    ("BER", "DE"), ("MUN", "DE"), ("FRA", "DE"), ("HAM", "DE"), ("DUS", "DE"),
    // United Kingdom
    ("LON", "GB"), ("EDI", "GB"), ("MAN", "GB"), ("BIR", "GB"), ("LIV", "GB"),
    // Portugal
    ("LIS", "PT"), ("POR", "PT"), ("ALG", "PT"), ("FNC", "PT"),
    // Greece
    ("ATH", "GR"), ("SAN", "GR"), ("MYK", "GR"), ("CRE", "GR"),
    // Switzerland
    ("ZUR", "CH"), ("GEN", "CH"), ("ZER", "CH"), ("INT", "CH"),
    // Austria
    ("VIE", "AT"), ("SAL", "AT"), ("INS", "AT"),
    // Benelux
    ("AMS", "NL"), ("ROT", "NL"), ("BRU", "BE"), ("BRG", "BE"),
    // Turkey
    ("IST", "TR"), ("ANT", "TR"), ("BOD", "TR"),
    // United States
    ("NYC", "US"), ("MIA", "US"), ("LAX", "US"), ("LAS", "US"), ("SFO", "US"),
    // Mexico
    ("CUN", "MX"), ("RIV", "MX"), ("CDM", "MX"), ("CAB", "MX"),
    // Caribbean
    ("PUJ", "DO"), ("MBJ", "JM"), ("BGI", "BB"), ("AUA", "AW"),
    // Asia and the Gulf
    ("BKK", "TH"), ("PHU", "TH"), ("SIN", "SG"), ("TYO", "JP"), ("DPS", "ID"),
    ("MLE", "MV"), ("DXB", "AE"), ("AUH", "AE"),
];

/// Lowercase names (English, Spanish and local spellings) to city codes.
const CITY_NAMES: &[(&str, &str)] = &[
    ("madrid", "MAD"), ("barcelona", "BCN"), ("mallorca", "PMI"), ("palma", "PMI"),
    ("palma de mallorca", "PMI"), ("marbella", "MAL"), ("ibiza", "IBZ"),
    ("sevilla", "SEV"), ("seville", "SEV"), ("valencia", "VAL"), ("granada", "GRA"),
    ("bilbao", "BIL"),
    ("paris", "PAR"), ("parís", "PAR"), ("nice", "NIC"), ("niza", "NIC"),
    ("cannes", "CAN"), ("lyon", "LYO"), ("marseille", "MRS"), ("marsella", "MRS"),
    ("bordeaux", "BOR"), ("burdeos", "BOR"), ("strasbourg", "STR"),
    ("estrasburgo", "STR"), ("monaco", "MON"), ("mónaco", "MON"),
    ("rome", "ROM"), ("roma", "ROM"), ("milan", "MIL"), ("milán", "MIL"),
    ("milano", "MIL"), ("venice", "VEN"), ("venecia", "VEN"), ("venezia", "VEN"),
    ("florence", "FLO"), ("florencia", "FLO"), ("firenze", "FLO"), ("naples", "NAP"),
    ("nápoles", "NAP"), ("napoli", "NAP"), ("amalfi", "AMF"), ("capri", "CAP"),
    ("berlin", "BER"), ("berlín", "BER"), ("munich", "MUN"), ("múnich", "MUN"),
    ("münchen", "MUN"), ("frankfurt", "FRA"), ("hamburg", "HAM"), ("hamburgo", "HAM"),
    ("düsseldorf", "DUS"), ("dusseldorf", "DUS"),
    ("london", "LON"), ("londres", "LON"), ("edinburgh", "EDI"), ("edimburgo", "EDI"),
    ("manchester", "MAN"), ("birmingham", "BIR"), ("liverpool", "LIV"),
    ("lisbon", "LIS"), ("lisboa", "LIS"), ("porto", "POR"), ("oporto", "POR"),
    ("algarve", "ALG"), ("madeira", "FNC"), ("funchal", "FNC"),
    ("athens", "ATH"), ("atenas", "ATH"), ("santorini", "SAN"), ("mykonos", "MYK"),
    ("miconos", "MYK"), ("crete", "CRE"), ("creta", "CRE"),
    ("zurich", "ZUR"), ("zürich", "ZUR"), ("zúrich", "ZUR"), ("geneva", "GEN"),
    ("ginebra", "GEN"), ("genève", "GEN"), ("zermatt", "ZER"), ("interlaken", "INT"),
    ("vienna", "VIE"), ("viena", "VIE"), ("wien", "VIE"), ("salzburg", "SAL"),
    ("salzburgo", "SAL"), ("innsbruck", "INS"),
    ("amsterdam", "AMS"), ("ámsterdam", "AMS"), ("rotterdam", "ROT"),
    ("róterdam", "ROT"), ("brussels", "BRU"), ("bruselas", "BRU"),
    ("bruxelles", "BRU"), ("bruges", "BRG"), ("brujas", "BRG"),
    ("istanbul", "IST"), ("estambul", "IST"), ("antalya", "ANT"), ("bodrum", "BOD"),
    ("new york", "NYC"), ("nueva york", "NYC"), ("miami", "MIA"),
    ("los angeles", "LAX"), ("la", "LAX"), ("las vegas", "LAS"),
    ("san francisco", "SFO"),
    ("cancun", "CUN"), ("cancún", "CUN"), ("riviera maya", "RIV"),
    ("mexico city", "CDM"), ("ciudad de mexico", "CDM"), ("ciudad de méxico", "CDM"),
    ("los cabos", "CAB"), ("cabo san lucas", "CAB"),
    ("punta cana", "PUJ"), ("montego bay", "MBJ"), ("barbados", "BGI"), ("aruba", "AUA"),
    ("bangkok", "BKK"), ("phuket", "PHU"), ("singapore", "SIN"), ("singapur", "SIN"),
    ("tokyo", "TYO"), ("tokio", "TYO"), ("bali", "DPS"), ("maldives", "MLE"),
    ("maldivas", "MLE"), ("dubai", "DXB"), ("dubái", "DXB"), ("abu dhabi", "AUH"),
];

/// Resolve a city name or 3-letter code to a city code.
pub fn resolve_city_code(input: &str) -> Option<&'static str> {
    let normalized = input.trim().to_lowercase();
    let upper = normalized.to_uppercase();

    if let Some((code, _)) = CITIES.iter().find(|(code, _)| *code == upper) {
        return Some(code);
    }

    CITY_NAMES
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, code)| *code)
}

/// Country of a known city code.
pub fn country_for_city(city_code: &str) -> Option<&'static str> {
    CITIES
        .iter()
        .find(|(code, _)| *code == city_code)
        .map(|(_, country)| *country)
}

/// Lowercase, trim, and strip combining marks after canonical decomposition.
pub fn normalize(text: &str) -> String {
    text.trim()
        .nfd()
        .filter(|c| !('\u{300}'..='\u{36f}').contains(c))
        .collect::<String>()
        .to_lowercase()
}

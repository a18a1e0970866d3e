//! Built-in labels and orderings of the truck registration dataset.

/// Short federal-district labels ("Central", "Volga", ...).
pub const FEDERAL_DISTRICTS: &str = "federal_districts";
/// Long federal-district labels ("Central Federal District", ...).
pub const FEDERAL_DISTRICTS_LONG: &str = "federal_districts_long";
/// Subjects of the federation plus the short district labels.
pub const REGIONS: &str = "regions";

/// Default display order of the federal districts.
pub const FEDERAL_DISTRICT_ORDER: &str = "federal_districts";
/// Same order, with the long labels.
pub const FEDERAL_DISTRICT_LONG_ORDER: &str = "federal_districts_long";

pub fn federal_district_order() -> [&'static str; 8] {
    [
        "Central",
        "North West",
        "Volga",
        "South",
        "North Caucasian",
        "Ural",
        "Siberia",
        "Far East",
    ]
}

pub fn federal_district_long_order() -> [&'static str; 8] {
    [
        "Central Federal District",
        "North West Federal District",
        "Volga Federal District",
        "Southern Federal District",
        "North Caucasian Federal District",
        "Ural Federal District",
        "Siberian Federal District",
        "Far Eastern Federal District",
    ]
}

pub fn federal_district_labels() -> [(&'static str, &'static str); 8] {
    [
        ("Центральный Федеральный Округ", "Central"),
        ("Северо-Западный Федеральный Округ", "North West"),
        ("Южный Федеральный Округ", "South"),
        ("Северо-Кавказский Федеральный Округ", "North Caucasian"),
        ("Приволжский Федеральный Округ", "Volga"),
        ("Уральский Федеральный Округ", "Ural"),
        ("Сибирский Федеральный Округ", "Siberia"),
        ("Дальневосточный Федеральный Округ", "Far East"),
    ]
}

pub fn federal_district_long_labels() -> [(&'static str, &'static str); 8] {
    [
        ("Центральный Федеральный Округ", "Central Federal District"),
        ("Северо-Западный Федеральный Округ", "North West Federal District"),
        ("Южный Федеральный Округ", "Southern Federal District"),
        ("Северо-Кавказский Федеральный Округ", "North Caucasian Federal District"),
        ("Приволжский Федеральный Округ", "Volga Federal District"),
        ("Уральский Федеральный Округ", "Ural Federal District"),
        ("Сибирский Федеральный Округ", "Siberian Federal District"),
        ("Дальневосточный Федеральный Округ", "Far Eastern Federal District"),
    ]
}

pub fn region_labels() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Новгородская область", "Novgorod Region"),
        ("Владимирская область", "Vladimir Region"),
        ("Мурманская область", "Murmansk Region"),
        ("Свердловская область", "Sverdlovsk Region"),
        ("Калининградская область", "Kaliningrad Region"),
        ("Тульская область", "Tula Region"),
        ("Рязанская область", "Ryazan Region"),
        ("Ярославская область", "Yaroslavl Region"),
        ("Воронежская область", "Voronezh Region"),
        ("Приморский край", "Primorsky Krai"),
        ("Чувашия Республика", "Chuvashia Republic"),
        ("Москва", "Moscow"),
        ("Сахалинская область", "Sakhalin Region"),
        ("Кировская область", "Kirov Region"),
        ("Белгородская область", "Belgorod Region"),
        ("Красноярский край", "Krasnoyarsk Krai"),
        ("Новосибирская область", "Novosibirsk Region"),
        ("Башкортостан Республика", "Bashkortostan Republic"),
        ("Ненецкий автономный округ", "Nenets Autonomous Okrug"),
        ("Чукотский автономный округ", "Chukotka Autonomous Okrug"),
        ("Тамбовская область", "Tambov Region"),
        ("Чеченская Республика", "Chechen Republic"),
        ("Коми Республика", "Komi Republic"),
        ("Алтайский край", "Altai Krai"),
        ("Татарстан Республика", "Tatarstan Republic"),
        ("Иркутская область", "Irkutsk Region"),
        ("Северная Осетия Республика", "North Ossetia Republic"),
        ("Ингушетия Республика", "Ingushetia Republic"),
        ("Крым Республика", "Crimea Republic"),
        ("Магаданская область", "Magadan Region"),
        ("Саха (Якутия) Республика", "Sakha (Yakutia) Republic"),
        ("Липецкая область", "Lipetsk Region"),
        ("Смоленская область", "Smolensk Region"),
        ("Орловская область", "Oryol Region"),
        ("Санкт-Петербург", "Saint Petersburg"),
        ("Луганская Народная Республика", "Luhansk People's Republic"),
        ("Хакасия Республика", "Khakassia Republic"),
        ("Саратовская область", "Saratov Region"),
        ("Донецкая Народная Республика", "Donetsk People's Republic"),
        ("Архангельская область", "Arkhangelsk Region"),
        ("Нижегородская область", "Nizhny Novgorod Region"),
        ("Волгоградская область", "Volgograd Region"),
        ("Курская область", "Kursk Region"),
        ("Пензенская область", "Penza Region"),
        ("Тверская область", "Tver Region"),
        ("Челябинская область", "Chelyabinsk Region"),
        ("Московская область", "Moscow Region"),
        ("Забайкальский край", "Zabaykalsky Krai"),
        ("Ямало-Ненецкий автономный округ", "Yamalo-Nenets Autonomous Okrug"),
        ("Брянская область", "Bryansk Region"),
        ("Курганская область", "Kurgan Region"),
        ("Удмуртия Республика", "Udmurtia Republic"),
        ("Самарская область", "Samara Region"),
        ("Калмыкия Республика", "Kalmykia Republic"),
        ("Ханты-Мансийский автономный округ", "Khanty-Mansi Autonomous Okrug"),
        ("Адыгея Республика", "Adygea Republic"),
        ("Амурская область", "Amur Region"),
        ("Томская область", "Tomsk Region"),
        ("Тыва Республика", "Tuva Republic"),
        ("Кабардино-Балкария Республика", "Kabardino-Balkaria Republic"),
        ("Астраханская область", "Astrakhan Region"),
        ("Ивановская область", "Ivanovo Region"),
        ("Псковская область", "Pskov Region"),
        ("Карелия Республика", "Karelia Republic"),
        ("Севастополь", "Sevastopol"),
        ("Вологодская область", "Vologda Region"),
        ("Тюменская область", "Tyumen Region"),
        ("Оренбургская область", "Orenburg Region"),
        ("Марий-Эл Республика", "Mari El Republic"),
        ("Ростовская область", "Rostov Region"),
        ("Краснодарский край", "Krasnodar Krai"),
        ("Алтай Республика", "Altai Republic"),
        ("Херсонская область", "Kherson Region"),
        ("Костромская область", "Kostroma Region"),
        ("Камчатский край", "Kamchatka Krai"),
        ("Омская область", "Omsk Region"),
        ("Запорожская область", "Zaporizhzhia Region"),
        ("Ленинградская область", "Leningrad Region"),
        ("Ульяновская область", "Ulyanovsk Region"),
        ("Дагестан Республика", "Dagestan Republic"),
        ("Калужская область", "Kaluga Region"),
        ("Кемеровская область", "Kemerovo Region"),
        ("Пермский край", "Perm Krai"),
        ("Мордовия Республика", "Mordovia Republic"),
        ("Хабаровский край", "Khabarovsk Krai"),
        ("Еврейский автономный округ", "Jewish Autonomous Okrug"),
        ("Карачаево-Черкессия Республика", "Karachay-Cherkessia Republic"),
        ("Ставропольский край", "Stavropol Krai"),
        ("Бурятия Республика", "Buryatia Republic"),
    ]
}

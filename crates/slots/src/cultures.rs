use crate::SlotTable;

const STORAGE: [&str; 49] = [
    "Nahrung",
    "Kuchen",
    "Met",
    "Wasser",
    "Lehm",
    "Bruchstein",
    "Weizen",
    "Holz",
    "Leder",
    "Wolle",
    "Eisen",
    "Gold",
    "Münze",
    "Mehl",
    "Honig",
    "Kraut",
    "Pilz",
    "Öl",
    "Backstein",
    "Dachziegel",
    "Steinblock",
    "Marmor",
    "Geschirr",
    "Möbel",
    "Schuhe",
    "Holzwerkzeug",
    "Eisenwerkzeug",
    "Waffenrock",
    "Lederrüstung",
    "Kettenhemd",
    "Plattenrüstung",
    "Kurzbogen",
    "Langbogen",
    "Holzspeer",
    "Eisenspeer",
    "Kurzschwert",
    "Langschwert",
    "Kleiner Nahrungstrank",
    "Großer Nahrungstrank",
    "Kleiner Wachtrank",
    "Großer Wachtrank",
    "Kleiner Heiltrank",
    "Großer Heiltrank",
    "Nahrungsamulett",
    "Wachbleibamulett",
    "Stärkeamulett",
    "Verteidigungsamulett",
    "Trefferamulett",
    "Windamulett",
];

const NAHRUNG: &[&str] = &["Honig", "Kuchen", "Mehl", "Met", "Nahrung", "Wasser", "Weizen"];

const BAUWAREN: &[&str] = &["Backstein", "Bruchstein", "Dachziegel", "Holz", "Lehm", "Marmor", "Steinblock"];

const RESSOURCEN: &[&str] = &["Eisen", "Gold", "Kraut", "Leder", "Münze", "Öl", "Pilz", "Wolle"];

const WAFFEN: &[&str] = &[
    "Eisenspeer",
    "Holzspeer",
    "Kettenhemd",
    "Kurzbogen",
    "Kurzschwert",
    "Langbogen",
    "Langschwert",
    "Lederrüstung",
    "Plattenrüstung",
    "Waffenrock",
];

const BONUS: &[&str] = &[
    "Eisenwerkzeug",
    "Geschirr",
    "Großer Heiltrank",
    "Großer Nahrungstrank",
    "Großer Wachtrank",
    "Holzwerkzeug",
    "Kleiner Heiltrank",
    "Kleiner Nahrungstrank",
    "Kleiner Wachtrank",
    "Möbel",
    "Schuhe",
];

const SONSTIGES: &[&str] = &[
    "Nahrungsamulett",
    "Stärkeamulett",
    "Trefferamulett",
    "Verteidigungsamulett",
    "Wachbleibamulett",
    "Windamulett",
];

pub(crate) fn table() -> SlotTable {
    let categories = [
        ("Nahrung", NAHRUNG),
        ("Bauwaren", BAUWAREN),
        ("Ressourcen", RESSOURCEN),
        ("Waffen", WAFFEN),
        ("Bonusgegenstände", BONUS),
        ("Sonstiges", SONSTIGES),
    ];

    // The lists above are fixed; a failure here means they went out of sync.
    let mut table = SlotTable::new(STORAGE).expect("storage names are unique");
    for (name, members) in categories {
        table = table.with_category(name, members.iter().copied())
            .expect("category members are storage names");
    }

    table
}

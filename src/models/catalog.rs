//! Suggested values offered when logging expenses. Free-form values are
//! still accepted everywhere.

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Matériaux",
    "Main-d'œuvre",
    "Plomberie",
    "Électricité",
    "Peinture",
    "Carrelage",
    "Parquet",
    "Menuiserie",
    "Cloisons",
    "Isolation",
    "Chauffage",
    "Outillage",
    "Transport",
    "Nettoyage",
    "Autre",
];

pub const ROOMS: &[&str] = &[
    "Cuisine",
    "Salon",
    "Salle de bain",
    "Chambre",
    "Bureau",
    "Couloir",
    "Entrée",
    "Balcon",
    "Cave",
    "Grenier",
    "Garage",
    "Général",
    "Autre",
];

/// Case-insensitive lookup returning the catalog spelling.
pub fn canonical<'a>(list: &[&'a str], value: &str) -> Option<&'a str> {
    let lower = value.trim().to_lowercase();
    list.iter().copied().find(|v| v.to_lowercase() == lower)
}

//! Frozen lookup tables: the crops the advisor may recommend, and the
//! state → cities table used for input assist. Neither is enforced by the
//! price ledger.

use std::collections::HashSet;

use axum::{extract::Path, routing::get, Json, Router};
use lazy_static::lazy_static;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub const APPROVED_CROPS: &[&str] = &[
    "Arecanut", "Other Kharif pulses", "Rice", "Banana", "Cashewnut", "Coconut", "Dry ginger", "Sugarcane",
    "Sweet potato", "Tapioca", "Black pepper", "Dry chillies", "other oilseeds", "Turmeric", "Maize",
    "Moong(Green Gram)", "Urad", "Arhar/Tur", "Groundnut", "Sunflower", "Bajra", "Castor seed", "Cotton(lint)",
    "Horse-gram", "Jowar", "Korra", "Ragi", "Tobacco", "Gram", "Wheat", "Masoor", "Sesamum", "Linseed",
    "Safflower", "Onion", "other misc. pulses", "Samai", "Small millets", "Coriander", "Potato",
    "Other Rabi pulses", "Soyabean", "Beans & Mutter(Vegetable)", "Bhindi", "Brinjal", "Citrus Fruit",
    "Cucumber", "Grapes", "Mango", "Orange", "other fibres", "Other Fresh Fruits", "Other Vegetables", "Papaya",
    "Pome Fruit", "Tomato", "Mesta", "Cowpea(Lobia)", "Lemon", "Pome Granet", "Sapota", "Cabbage",
    "Rapeseed &Mustard", "Peas (vegetable)", "Niger seed", "Bottle Gourd", "Varagu", "Garlic", "Ginger",
    "Oilseeds total", "Pulses total", "Jute", "Peas & beans (Pulses)", "Blackgram", "Paddy", "Pineapple",
    "Barley", "Sannhamp", "Khesari", "Guar seed", "Moth", "Other Cereals & Millets", "Cond-spcs other",
    "Turnip", "Carrot", "Redish", "Arcanut (Processed)", "Atcanut (Raw)", "Cashewnut Processed",
    "Cashewnut Raw", "Cardamom", "Rubber", "Bitter Gourd", "Drum Stick", "Jack Fruit", "Snak Guard", "Tea",
    "Coffee", "Cauliflower", "Other Citrus Fruit", "Water Melon", "Total foodgrain", "Kapas", "Colocosia",
    "Lentil", "Bean", "Jobster", "Perilla", "Rajmash Kholar", "Ricebean (nagadal)", "Ash Gourd", "Beet Root",
    "Lab-Lab", "Ribed Guard", "Yam", "Pump Kin", "Apple", "Peach", "Pear", "Plums", "Litchi", "Ber",
    "Other Dry Fruit", "Jute & mesta",
];

pub const STATE_CITIES: &[(&str, &[&str])] = &[
    ("Andhra Pradesh", &["Visakhapatnam", "Vijayawada", "Guntur", "Nellore", "Kurnool", "Tirupati"]),
    ("Arunachal Pradesh", &["Itanagar", "Naharlagun", "Pasighat", "Tawang"]),
    ("Assam", &["Guwahati", "Silchar", "Dibrugarh", "Jorhat", "Nagaon", "Tezpur"]),
    ("Bihar", &["Patna", "Gaya", "Bhagalpur", "Muzaffarpur", "Darbhanga", "Purnia"]),
    ("Chhattisgarh", &["Raipur", "Bhilai", "Bilaspur", "Korba", "Durg", "Rajnandgaon"]),
    ("Goa", &["Panaji", "Margao", "Vasco da Gama", "Mapusa"]),
    ("Gujarat", &["Ahmedabad", "Surat", "Vadodara", "Rajkot", "Bhavnagar", "Junagadh"]),
    ("Haryana", &["Faridabad", "Gurugram", "Panipat", "Ambala", "Hisar", "Karnal"]),
    ("Himachal Pradesh", &["Shimla", "Mandi", "Solan", "Dharamshala", "Kullu"]),
    ("Jharkhand", &["Ranchi", "Jamshedpur", "Dhanbad", "Bokaro", "Hazaribagh", "Deoghar"]),
    ("Karnataka", &["Bengaluru", "Mysuru", "Hubballi", "Mangaluru", "Belagavi", "Davanagere"]),
    ("Kerala", &["Thiruvananthapuram", "Kochi", "Kozhikode", "Thrissur", "Kollam", "Palakkad"]),
    ("Madhya Pradesh", &["Bhopal", "Indore", "Jabalpur", "Gwalior", "Ujjain", "Sagar"]),
    ("Maharashtra", &["Mumbai", "Pune", "Nagpur", "Nashik", "Aurangabad", "Solapur"]),
    ("Manipur", &["Imphal", "Thoubal", "Bishnupur", "Churachandpur"]),
    ("Meghalaya", &["Shillong", "Tura", "Jowai", "Nongpoh"]),
    ("Mizoram", &["Aizawl", "Lunglei", "Champhai", "Serchhip"]),
    ("Nagaland", &["Kohima", "Dimapur", "Mokokchung", "Wokha"]),
    ("Odisha", &["Bhubaneswar", "Cuttack", "Rourkela", "Berhampur", "Sambalpur", "Balasore"]),
    ("Punjab", &["Ludhiana", "Amritsar", "Jalandhar", "Patiala", "Bathinda", "Mohali"]),
    ("Rajasthan", &["Jaipur", "Jodhpur", "Kota", "Bikaner", "Ajmer", "Udaipur"]),
    ("Sikkim", &["Gangtok", "Namchi", "Gyalshing", "Mangan"]),
    ("Tamil Nadu", &["Chennai", "Coimbatore", "Madurai", "Tiruchirappalli", "Salem", "Tirunelveli"]),
    ("Telangana", &["Hyderabad", "Warangal", "Nizamabad", "Karimnagar", "Khammam"]),
    ("Tripura", &["Agartala", "Udaipur", "Dharmanagar", "Kailashahar"]),
    ("Uttar Pradesh", &["Lucknow", "Kanpur", "Varanasi", "Agra", "Prayagraj", "Meerut"]),
    ("Uttarakhand", &["Dehradun", "Haridwar", "Haldwani", "Roorkee", "Rudrapur"]),
    ("West Bengal", &["Kolkata", "Howrah", "Durgapur", "Asansol", "Siliguri", "Bardhaman"]),
    ("Delhi", &["New Delhi"]),
    ("Jammu and Kashmir", &["Srinagar", "Jammu", "Anantnag", "Baramulla"]),
];

lazy_static! {
    static ref APPROVED_SET: HashSet<&'static str> = APPROVED_CROPS.iter().copied().collect();
}

/// Exact, case-sensitive membership in the approved crop list.
pub fn is_approved_crop(name: &str) -> bool {
    APPROVED_SET.contains(name)
}

/// Cities of `state`, matched case-insensitively.
pub fn cities_of(state: &str) -> Option<&'static [&'static str]> {
    let state = state.trim();
    STATE_CITIES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(state))
        .map(|(_, cities)| *cities)
}

#[derive(Debug, Serialize)]
pub struct StateEntry {
    pub state: &'static str,
    pub cities: &'static [&'static str],
}

pub fn reference_routes() -> Router<AppState> {
    Router::new()
        .route("/reference/crops", get(crops))
        .route("/reference/states", get(states))
        .route("/reference/states/:state/cities", get(cities))
}

async fn crops() -> Json<&'static [&'static str]> {
    Json(APPROVED_CROPS)
}

async fn states() -> Json<Vec<StateEntry>> {
    Json(
        STATE_CITIES
            .iter()
            .map(|&(state, cities)| StateEntry { state, cities })
            .collect(),
    )
}

async fn cities(Path(state): Path<String>) -> AppResult<Json<&'static [&'static str]>> {
    cities_of(&state)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Unknown state '{state}'")))
}

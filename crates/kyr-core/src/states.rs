//! US state lookup table.

/// Postal code and full name for each of the 50 states, alphabetical by name.
const STATES: [(&str, &str); 50] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

/// All state names, alphabetical.
pub fn all_states() -> impl Iterator<Item = &'static str> {
    STATES.iter().map(|(_, name)| *name)
}

/// Resolve a state name or postal code (case-insensitive) to its canonical name.
pub fn find_state(query: &str) -> Option<&'static str> {
    let query = query.trim();
    STATES
        .iter()
        .find(|(code, name)| name.eq_ignore_ascii_case(query) || code.eq_ignore_ascii_case(query))
        .map(|(_, name)| *name)
}

/// Full name for a two-letter postal code.
pub fn state_name_for_code(code: &str) -> Option<&'static str> {
    let code = code.trim();
    STATES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// States whose name contains `term`, case-insensitive. An empty term matches all.
pub fn search_states(term: &str) -> Vec<&'static str> {
    let term = term.trim().to_lowercase();
    all_states()
        .filter(|name| name.to_lowercase().contains(&term))
        .collect()
}

//! Synthetic employee record generation.
//!
//! Draws from embedded name, job, and address pools. Generation is generic
//! over the RNG so tests can use a seeded [`rand::rngs::StdRng`] and assert
//! exact output.

use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;

use roster_core::types::Employee;

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Christopher", "Lisa", "Daniel", "Nancy", "Matthew", "Betty", "Anthony",
    "Margaret", "Mark", "Sandra", "Donald", "Ashley", "Steven", "Kimberly", "Paul", "Emily",
    "Andrew", "Donna", "Joshua", "Michelle",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
    "Scott", "Torres", "Nguyen", "Hill", "Flores",
];

/// Position titles. The first word doubles as the department name.
const POSITIONS: &[&str] = &[
    "Engineering Manager",
    "Engineering Lead",
    "Software Engineer",
    "Marketing Manager",
    "Marketing Analyst",
    "Sales Executive",
    "Sales Representative",
    "Finance Analyst",
    "Finance Controller",
    "Operations Coordinator",
    "Operations Manager",
    "Design Director",
    "Design Researcher",
    "Support Specialist",
    "Support Engineer",
    "Legal Counsel",
    "Legal Assistant",
    "Research Scientist",
    "Research Associate",
    "Product Manager",
    "Product Analyst",
];

const STREET_NAMES: &[&str] = &[
    "Maple", "Oak", "Cedar", "Pine", "Elm", "Washington", "Lake", "Hill", "Sunset", "Park",
    "Madison", "Jefferson", "Franklin", "Chestnut", "Willow",
];

const STREET_SUFFIXES: &[&str] = &["Street", "Avenue", "Drive", "Lane", "Road", "Court"];

const CITIES: &[&str] = &[
    "Springfield", "Riverton", "Fairview", "Kingsport", "Brookhaven", "Lakewood", "Ashford",
    "Milton", "Clayton", "Georgetown", "Arlington", "Burlington",
];

const STATES: &[&str] = &["IL", "OH", "TX", "CA", "NY", "WA", "GA", "CO", "NC", "PA"];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

/// Pool-based employee record generator.
pub struct EmployeeGenerator {
    /// Date used as "now" for hire dates and ages, so a whole batch is
    /// generated against one consistent calendar reference.
    today: NaiveDate,
}

impl EmployeeGenerator {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Generate `count` raw records with IDs 1..=count.
    pub fn generate<R: Rng>(&self, rng: &mut R, count: u32) -> Vec<Employee> {
        (1..=count as i64)
            .map(|id| self.generate_one(rng, id))
            .collect()
    }

    /// Generate a single raw record.
    ///
    /// Raw means pre-transform: the address still carries a newline
    /// between its street and city lines, as a postal address would.
    pub fn generate_one<R: Rng>(&self, rng: &mut R, id: i64) -> Employee {
        let first = pick(rng, FIRST_NAMES);
        let last = pick(rng, LAST_NAMES);
        let position = pick(rng, POSITIONS);
        let department = position
            .split_whitespace()
            .next()
            .unwrap_or(position)
            .to_string();

        let hire_date = self.today - Duration::days(rng.random_range(0..=3650));
        let age_days = rng.random_range((22 * 365)..=(65 * 365));
        let date_of_birth = self.today - Duration::days(age_days);

        Employee {
            id,
            name: format!("{} {}", first, last),
            department,
            position: position.to_string(),
            salary: rng.random_range(40..=180) * 1000,
            email: format!(
                "{}.{}@{}",
                first.to_lowercase(),
                last.to_lowercase(),
                pick(rng, EMAIL_DOMAINS)
            ),
            phone: format!(
                "({:03}) {:03}-{:04}",
                rng.random_range(200..1000),
                rng.random_range(0..1000u32),
                rng.random_range(0..10000u32)
            ),
            address: format!(
                "{} {} {}\n{}, {} {:05}",
                rng.random_range(1..2000u32),
                pick(rng, STREET_NAMES),
                pick(rng, STREET_SUFFIXES),
                pick(rng, CITIES),
                pick(rng, STATES),
                rng.random_range(10000..100000u32)
            ),
            hire_date,
            date_of_birth,
            ssn: format!(
                "{:03}-{:02}-{:04}",
                rng.random_range(100..900u32),
                rng.random_range(10..100u32),
                rng.random_range(0..10000u32)
            ),
            username: format!(
                "{}{}{}",
                first.to_lowercase().chars().next().unwrap_or('x'),
                last.to_lowercase(),
                rng.random_range(1..100u32)
            ),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }
}

fn pick<'a, R: Rng>(rng: &mut R, pool: &'a [&'a str]) -> &'a str {
    pool[rng.random_range(0..pool.len())]
}

/// Age in whole years at `today` for someone born on `dob`.
pub fn age_years(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

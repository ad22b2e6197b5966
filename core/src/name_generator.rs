//! Deterministic identity generation using curated lists.
//!
//! Names, organizations, street addresses and contact details for
//! synthetic constituents. Same RNG stream, same identities.

use crate::model::Gender;
use crate::rng::StageRng;

/// Deterministic identity generator using curated lists
pub struct NameGenerator;

impl NameGenerator {
    /// First name matching the gender; non-binary draws from both lists.
    pub fn first_name(gender: Gender, rng: &mut StageRng) -> &'static str {
        let names = match gender {
            Gender::Female => Self::female_first_names(),
            Gender::Male => Self::male_first_names(),
            Gender::NonBinary => {
                if rng.chance(0.5) {
                    Self::female_first_names()
                } else {
                    Self::male_first_names()
                }
            }
        };
        Self::pick(names, rng)
    }

    pub fn last_name(rng: &mut StageRng) -> &'static str {
        Self::pick(Self::last_names(), rng)
    }

    /// Organization name: "Prefix Industry Suffix" or "LastName Industry Suffix".
    pub fn organization_name(rng: &mut StageRng) -> String {
        let industry = Self::pick(Self::org_industries(), rng);
        let suffix = Self::pick(Self::org_suffixes(), rng);
        let head = if rng.chance(0.5) {
            Self::pick(Self::org_prefixes(), rng)
        } else {
            Self::last_name(rng)
        };
        format!("{head} {industry} {suffix}")
    }

    /// Short login-style handle used as the local part of org emails.
    pub fn user_handle(rng: &mut StageRng) -> String {
        let first = Self::pick(Self::male_first_names(), rng).to_lowercase();
        let n = rng.next_u64_below(100);
        format!("{first}{n:02}")
    }

    pub fn email_domain(rng: &mut StageRng) -> &'static str {
        Self::pick(
            &["gmail.com", "yahoo.com", "hotmail.com", "outlook.com", "icloud.com", "aol.com"],
            rng,
        )
    }

    pub fn street_address(rng: &mut StageRng) -> String {
        let number = 100 + rng.next_u64_below(9_900);
        let street = Self::pick(Self::street_names(), rng);
        let kind = Self::pick(&["St", "Ave", "Rd", "Ln", "Dr", "Ct", "Way", "Blvd"], rng);
        format!("{number} {street} {kind}")
    }

    pub fn city(rng: &mut StageRng) -> &'static str {
        Self::pick(Self::cities(), rng)
    }

    pub fn postal_code(rng: &mut StageRng) -> String {
        format!("{:05}", 1_000 + rng.next_u64_below(98_000))
    }

    pub fn phone_number(rng: &mut StageRng) -> String {
        let area = 201 + rng.next_u64_below(780);
        let exchange = 200 + rng.next_u64_below(800);
        let line = rng.next_u64_below(10_000);
        format!("({area}) {exchange}-{line:04}")
    }

    fn pick(list: &'static [&'static str], rng: &mut StageRng) -> &'static str {
        list[rng.next_u64_below(list.len() as u64) as usize]
    }

    fn male_first_names() -> &'static [&'static str] {
        &[
            "James", "John", "Robert", "Michael", "William", "David", "Richard", "Joseph",
            "Thomas", "Charles", "Christopher", "Daniel", "Matthew", "Anthony", "Mark",
            "Donald", "Steven", "Paul", "Andrew", "Joshua", "Kenneth", "Kevin", "Brian",
            "George", "Timothy", "Ronald", "Edward", "Jason", "Jeffrey", "Ryan",
            "Jacob", "Gary", "Nicholas", "Eric", "Jonathan", "Stephen", "Larry", "Justin",
            "Scott", "Brandon", "Benjamin", "Samuel", "Raymond", "Gregory", "Frank",
            "Alexander", "Patrick", "Jack", "Dennis", "Tyler", "Aaron", "Jose",
            "Adam", "Nathan", "Henry", "Douglas", "Zachary", "Peter", "Kyle", "Noah",
            "Ethan", "Jeremy", "Walter", "Christian", "Keith", "Roger", "Austin",
            "Sean", "Carl", "Harold", "Dylan", "Arthur", "Lawrence", "Jordan",
            "Bryan", "Bruce", "Gabriel", "Juan", "Albert", "Elijah", "Logan", "Mason",
        ]
    }

    fn female_first_names() -> &'static [&'static str] {
        &[
            "Mary", "Patricia", "Jennifer", "Linda", "Barbara", "Elizabeth", "Susan",
            "Jessica", "Sarah", "Karen", "Lisa", "Nancy", "Betty", "Margaret", "Sandra",
            "Ashley", "Kimberly", "Emily", "Donna", "Michelle", "Carol", "Amanda", "Dorothy",
            "Melissa", "Deborah", "Stephanie", "Rebecca", "Sharon", "Laura", "Cynthia",
            "Kathleen", "Amy", "Angela", "Shirley", "Anna", "Brenda", "Pamela", "Emma",
            "Nicole", "Helen", "Samantha", "Katherine", "Christine", "Rachel",
            "Carolyn", "Janet", "Catherine", "Maria", "Heather", "Diane", "Ruth", "Julie",
            "Olivia", "Joyce", "Virginia", "Victoria", "Kelly", "Lauren", "Christina",
            "Joan", "Evelyn", "Judith", "Megan", "Andrea", "Hannah", "Jacqueline",
            "Martha", "Gloria", "Teresa", "Madison", "Frances", "Kathryn",
            "Abigail", "Alice", "Sophia", "Grace", "Denise", "Natalie", "Charlotte", "Ava",
        ]
    }

    fn last_names() -> &'static [&'static str] {
        &[
            "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis",
            "Rodriguez", "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson",
            "Thomas", "Taylor", "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson",
            "White", "Harris", "Sanchez", "Clark", "Ramirez", "Lewis", "Robinson",
            "Walker", "Young", "Allen", "King", "Wright", "Scott", "Torres", "Nguyen",
            "Hill", "Flores", "Green", "Adams", "Nelson", "Baker", "Hall", "Rivera",
            "Campbell", "Mitchell", "Carter", "Roberts", "Gomez", "Phillips", "Evans",
            "Turner", "Diaz", "Parker", "Cruz", "Edwards", "Collins", "Reyes", "Stewart",
            "Morris", "Morales", "Murphy", "Cook", "Rogers", "Ortiz", "Morgan",
            "Cooper", "Peterson", "Bailey", "Reed", "Kelly", "Howard", "Ramos", "Kim",
            "Cox", "Ward", "Richardson", "Watson", "Brooks", "Chavez", "Wood", "Bennett",
            "Gray", "Mendoza", "Hughes", "Price", "Alvarez", "Castillo", "Patel", "Myers",
            "Long", "Ross", "Foster", "Powell", "Jenkins", "Perry", "Sullivan", "Bell",
        ]
    }

    fn org_prefixes() -> &'static [&'static str] {
        &[
            "Premier", "First", "Summit", "Heritage", "Evergreen", "Metro", "Valley",
            "Coastal", "Central", "United", "Northern", "Pacific", "Prairie", "Riverside",
            "Cedar", "Harbor",
        ]
    }

    fn org_industries() -> &'static [&'static str] {
        &[
            "Construction", "Consulting", "Design", "Development", "Accounting", "Legal",
            "Medical", "Energy", "Logistics", "Realty", "Insurance", "Financial",
            "Technology", "Manufacturing", "Outfitters", "Brewing", "Community",
        ]
    }

    fn org_suffixes() -> &'static [&'static str] {
        &[
            "LLC", "Inc", "Corp", "Group", "Partners", "Foundation", "Trust", "Holdings",
            "Associates", "Cooperative",
        ]
    }

    fn street_names() -> &'static [&'static str] {
        &[
            "Oak", "Maple", "Cedar", "Pine", "Elm", "Willow", "Birch", "Aspen", "Lake",
            "Hill", "Park", "River", "Meadow", "Forest", "Sunset", "Highland", "Washington",
            "Lincoln", "Madison", "Jefferson", "Church", "Main", "Spring", "Ridge",
        ]
    }

    fn cities() -> &'static [&'static str] {
        &[
            "Springfield", "Riverton", "Fairview", "Greenville", "Franklin", "Clinton",
            "Georgetown", "Salem", "Madison", "Ashland", "Oakdale", "Lakewood", "Milford",
            "Bristol", "Burlington", "Dover", "Hudson", "Kingston", "Newport", "Oxford",
            "Arlington", "Centerville", "Marion", "Jackson",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StageSlot};

    #[test]
    fn name_generation_is_deterministic() {
        let mut rng1 = RngBank::new(12345).for_stage(StageSlot::Constituent);
        let mut rng2 = RngBank::new(12345).for_stage(StageSlot::Constituent);

        let a = (
            NameGenerator::first_name(Gender::Female, &mut rng1),
            NameGenerator::last_name(&mut rng1),
        );
        let b = (
            NameGenerator::first_name(Gender::Female, &mut rng2),
            NameGenerator::last_name(&mut rng2),
        );
        assert_eq!(a, b, "Same seed should produce same name");
    }

    #[test]
    fn first_names_follow_gender() {
        let mut rng = RngBank::new(7).for_stage(StageSlot::Constituent);
        for _ in 0..50 {
            let name = NameGenerator::first_name(Gender::Male, &mut rng);
            assert!(NameGenerator::male_first_names().contains(&name));
            let name = NameGenerator::first_name(Gender::Female, &mut rng);
            assert!(NameGenerator::female_first_names().contains(&name));
        }
    }

    #[test]
    fn generates_valid_organization_names() {
        let mut rng = RngBank::new(12345).for_stage(StageSlot::Constituent);
        for _ in 0..50 {
            let name = NameGenerator::organization_name(&mut rng);
            let parts: Vec<&str> = name.split_whitespace().collect();
            assert!(parts.len() >= 3, "Organization name too short: {name}");
        }
    }

    #[test]
    fn contact_details_are_well_formed() {
        let mut rng = RngBank::new(1).for_stage(StageSlot::Constituent);
        for _ in 0..50 {
            let zip = NameGenerator::postal_code(&mut rng);
            assert_eq!(zip.len(), 5, "bad postal code {zip}");
            let phone = NameGenerator::phone_number(&mut rng);
            assert_eq!(phone.len(), 14, "bad phone {phone}");
        }
    }
}

//! Household pairing.
//!
//! Individuals are walked in constituent order. Each unassigned one may
//! pair with a partner from a short look-ahead window, pick up a few
//! extra members from the constituents right after, and otherwise stands
//! alone. Organizations never join households.
//!
//! The naming rules are small pure functions so each can be checked
//! against its probability table in isolation.

use crate::{
    dataset::Dataset,
    error::GenResult,
    event::GenEvent,
    model::{Constituent, Gender, HouseholdMember, Person},
    rng::StageRng,
    stage::GenerationStage,
    types::HouseholdId,
    weighted,
};

pub const PAIRING_PROBABILITY: f64 = 0.75;
/// Look-ahead for a partner, in constituents after the current one.
pub const PARTNER_WINDOW: usize = 9;
/// Wider look-ahead used when a same-sex pairing needs a same-gender partner.
pub const SAME_GENDER_WINDOW: usize = 19;
pub const SAME_SEX_PROBABILITY: f64 = 0.075;
pub const SEPARATE_SURNAMES_PROBABILITY: f64 = 0.30;
pub const TRADITIONAL_FORMAT_PROBABILITY: f64 = 0.70;
pub const EXTRA_MEMBER_WEIGHTS: [(usize, f64); 4] = [(0, 60.0), (1, 25.0), (2, 10.0), (3, 5.0)];
pub const FEMALE_TITLE_WEIGHTS: [(&str, f64); 3] = [("Ms.", 0.6), ("Mrs.", 0.3), ("Miss", 0.1)];

/// How a couple's household is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoupleNaming {
    /// "First Last & First Last".
    Separate { partner_first: bool },
    /// Both members shown under one surname.
    Shared {
        surname_from_partner: bool,
        style: SharedStyle,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedStyle {
    /// "Mr. & Mrs. <his first name> <surname>".
    Traditional,
    /// "A & B <surname>".
    FirstNames { partner_first: bool },
}

/// Formal title for a single-person household.
pub fn formal_title(gender: Gender, rng: &mut StageRng) -> &'static str {
    match gender {
        Gender::Female => weighted::pick(&FEMALE_TITLE_WEIGHTS, rng).copied().unwrap_or("Ms."),
        Gender::Male => "Mr.",
        Gender::NonBinary => "Mx.",
    }
}

pub fn single_household_name(person: &Person, rng: &mut StageRng) -> String {
    let title = formal_title(person.gender, rng);
    format!("{title} {} {}", person.first_name, person.last_name)
}

fn is_opposite_gender(a: &Person, b: &Person) -> bool {
    matches!(
        (a.gender, b.gender),
        (Gender::Male, Gender::Female) | (Gender::Female, Gender::Male)
    )
}

/// Decide the surname policy and display format for a couple.
pub fn choose_couple_naming(
    primary: &Person,
    partner: &Person,
    same_sex: bool,
    rng: &mut StageRng,
) -> CoupleNaming {
    if rng.chance(SEPARATE_SURNAMES_PROBABILITY) {
        return CoupleNaming::Separate {
            partner_first: !rng.chance(0.5),
        };
    }
    let surname_from_partner = !rng.chance(0.5);
    let traditional_allowed = !same_sex && is_opposite_gender(primary, partner);
    let style = if traditional_allowed && rng.chance(TRADITIONAL_FORMAT_PROBABILITY) {
        SharedStyle::Traditional
    } else {
        SharedStyle::FirstNames {
            partner_first: !rng.chance(0.5),
        }
    };
    CoupleNaming::Shared {
        surname_from_partner,
        style,
    }
}

pub fn render_couple_name(primary: &Person, partner: &Person, naming: CoupleNaming) -> String {
    match naming {
        CoupleNaming::Separate { partner_first } => {
            let (a, b) = if partner_first { (partner, primary) } else { (primary, partner) };
            format!("{} {} & {} {}", a.first_name, a.last_name, b.first_name, b.last_name)
        }
        CoupleNaming::Shared {
            surname_from_partner,
            style,
        } => {
            let surname = if surname_from_partner {
                &partner.last_name
            } else {
                &primary.last_name
            };
            match style {
                SharedStyle::Traditional => {
                    let his = if partner.gender == Gender::Male { partner } else { primary };
                    format!("Mr. & Mrs. {} {surname}", his.first_name)
                }
                SharedStyle::FirstNames { partner_first } => {
                    let (a, b) = if partner_first { (partner, primary) } else { (primary, partner) };
                    format!("{} & {} {surname}", a.first_name, b.first_name)
                }
            }
        }
    }
}

/// An individual constituent with its person fields unwrapped.
struct Member<'a> {
    constituent: &'a Constituent,
    person: &'a Person,
}

fn member_row(
    household_id: HouseholdId,
    name: &str,
    member: &Constituent,
    primary: &Constituent,
) -> HouseholdMember {
    HouseholdMember {
        household_id,
        name: name.to_string(),
        constituent_id: member.constituent_id,
        primary_constituent_id: primary.constituent_id,
        is_primary: member.constituent_id == primary.constituent_id,
        address: primary.address.clone(),
        city: primary.city.clone(),
        state: primary.state.clone(),
        postal_code: primary.postal_code.clone(),
        creation_date: primary.creation_date,
    }
}

/// Partition every individual in `constituents` into households.
pub fn pair_households(constituents: &[Constituent], rng: &mut StageRng) -> Vec<HouseholdMember> {
    let people: Vec<Member> = constituents
        .iter()
        .filter_map(|c| c.person().map(|person| Member { constituent: c, person }))
        .collect();
    let n = people.len();
    let mut assigned = vec![false; n];
    let mut rows = Vec::with_capacity(n);
    let mut household_id: HouseholdId = 1;

    for i in 0..n {
        if assigned[i] {
            continue;
        }
        let current = &people[i];

        if rng.chance(PAIRING_PROBABILITY) {
            let window_end = (i + 1 + PARTNER_WINDOW).min(n);
            let candidates: Vec<usize> = (i + 1..window_end).filter(|j| !assigned[*j]).collect();

            if let Some(&first_pick) = rng.choose(&candidates) {
                let mut partner_idx = first_pick;
                let same_sex = rng.chance(SAME_SEX_PROBABILITY);
                if same_sex && people[partner_idx].person.gender != current.person.gender {
                    let wide_end = (i + 1 + SAME_GENDER_WINDOW).min(n);
                    let same_gender: Vec<usize> = (i + 1..wide_end)
                        .filter(|j| !assigned[*j] && people[*j].person.gender == current.person.gender)
                        .collect();
                    if let Some(&j) = rng.choose(&same_gender) {
                        partner_idx = j;
                    }
                }
                let partner = &people[partner_idx];

                let naming = choose_couple_naming(current.person, partner.person, same_sex, rng);
                let name = render_couple_name(current.person, partner.person, naming);

                rows.push(member_row(household_id, &name, current.constituent, current.constituent));
                rows.push(member_row(household_id, &name, partner.constituent, current.constituent));
                assigned[i] = true;
                assigned[partner_idx] = true;

                let extra = weighted::pick(&EXTRA_MEMBER_WEIGHTS, rng).copied().unwrap_or(0);
                let mut added = 0;
                let mut search = i.max(partner_idx) + 1;
                while added < extra && search < n {
                    if !assigned[search] {
                        rows.push(member_row(
                            household_id,
                            &name,
                            people[search].constituent,
                            current.constituent,
                        ));
                        assigned[search] = true;
                        added += 1;
                    }
                    search += 1;
                }

                household_id += 1;
                continue;
            }
        }

        let name = single_household_name(current.person, rng);
        rows.push(member_row(household_id, &name, current.constituent, current.constituent));
        assigned[i] = true;
        household_id += 1;
    }

    // Sweep: anyone the loop never placed stands alone.
    for (i, member) in people.iter().enumerate() {
        if !assigned[i] {
            let name = single_household_name(member.person, rng);
            rows.push(member_row(household_id, &name, member.constituent, member.constituent));
            assigned[i] = true;
            household_id += 1;
        }
    }

    rows
}

pub struct HouseholdStage;

impl GenerationStage for HouseholdStage {
    fn name(&self) -> &'static str {
        "household"
    }

    fn run(&mut self, data: &mut Dataset, rng: &mut StageRng) -> GenResult<Vec<GenEvent>> {
        data.households = pair_households(&data.constituents, rng);
        let households = data.households.iter().filter(|h| h.is_primary).count();
        log::info!(
            "stage=household: {} individuals placed in {households} households",
            data.households.len()
        );
        Ok(vec![GenEvent::StageCompleted {
            stage: self.name().into(),
            rows: data.households.len(),
        }])
    }
}

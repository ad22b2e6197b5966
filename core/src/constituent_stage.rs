use crate::{
    config::GeneratorConfig,
    dataset::Dataset,
    error::GenResult,
    event::GenEvent,
    model::{
        Constituent, ConstituentKind, Gender, GivingAggregates, Organization, OrganizationType,
        Person,
    },
    name_generator::NameGenerator,
    rng::StageRng,
    stage::GenerationStage,
    types::ConstituentId,
    weighted,
};

const GENDER_WEIGHTS: [(Gender, f64); 3] = [
    (Gender::Female, 0.495),
    (Gender::Male, 0.495),
    (Gender::NonBinary, 0.01),
];

pub struct ConstituentStage {
    config: GeneratorConfig,
}

impl ConstituentStage {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Organizations first, then individuals; ids run 1..=constituent_count.
    pub fn generate_population(&self, rng: &mut StageRng) -> Vec<Constituent> {
        let n = self.config.constituent_count;
        let n_org = self.config.organization_count();
        let geography: Vec<(&str, f64)> = self
            .config
            .geography
            .iter()
            .map(|w| (w.state.as_str(), w.weight))
            .collect();

        (0..n)
            .map(|i| {
                let id = (i + 1) as ConstituentId;
                let state = weighted::pick(&geography, rng)
                    .copied()
                    .unwrap_or("CA")
                    .to_string();
                if i < n_org {
                    self.organization(id, state, rng)
                } else {
                    self.individual(id, state, rng)
                }
            })
            .collect()
    }

    fn organization(&self, id: ConstituentId, state: String, rng: &mut StageRng) -> Constituent {
        let organization_type = *rng
            .choose(&OrganizationType::ALL)
            .unwrap_or(&OrganizationType::Corporation);
        let organization_name = NameGenerator::organization_name(rng);
        let domain: String = organization_name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        let email = format!("{}@{domain}.com", NameGenerator::user_handle(rng));
        self.with_contact(
            id,
            ConstituentKind::Organization(Organization {
                organization_name,
                organization_type,
            }),
            email,
            state,
            rng,
        )
    }

    fn individual(&self, id: ConstituentId, state: String, rng: &mut StageRng) -> Constituent {
        let gender = *weighted::pick(&GENDER_WEIGHTS, rng).unwrap_or(&Gender::NonBinary);
        let first_name = NameGenerator::first_name(gender, rng).to_string();
        let last_name = NameGenerator::last_name(rng).to_string();
        let email = format!(
            "{}.{}@{}",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            NameGenerator::email_domain(rng)
        );
        self.with_contact(
            id,
            ConstituentKind::Individual(Person {
                first_name,
                last_name,
                gender,
            }),
            email,
            state,
            rng,
        )
    }

    fn with_contact(
        &self,
        constituent_id: ConstituentId,
        kind: ConstituentKind,
        email: String,
        state: String,
        rng: &mut StageRng,
    ) -> Constituent {
        let phone = NameGenerator::phone_number(rng);
        let address = NameGenerator::street_address(rng);
        let city = NameGenerator::city(rng).to_string();
        let postal_code = NameGenerator::postal_code(rng);
        let creation_date = rng
            .date_between(self.config.start_date, self.config.end_date)
            .unwrap_or(self.config.start_date);
        Constituent {
            constituent_id,
            kind,
            email,
            phone,
            address,
            city,
            state,
            postal_code,
            creation_date,
            giving: GivingAggregates::default(),
        }
    }
}

impl GenerationStage for ConstituentStage {
    fn name(&self) -> &'static str {
        "constituent"
    }

    fn run(&mut self, data: &mut Dataset, rng: &mut StageRng) -> GenResult<Vec<GenEvent>> {
        data.constituents = self.generate_population(rng);
        let orgs = self.config.organization_count().min(data.constituents.len());
        log::info!(
            "stage=constituent: generated {} constituents ({orgs} organizations)",
            data.constituents.len()
        );
        Ok(vec![GenEvent::StageCompleted {
            stage: self.name().into(),
            rows: data.constituents.len(),
        }])
    }
}

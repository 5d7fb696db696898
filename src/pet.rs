use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PlannerError, PlannerResult};

/// Read-only profile the planner needs for report headers. The pet's name
/// doubles as the identifier tasks are tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    name: String,
    age: u32,
    species: String,
}

impl Pet {
    pub fn new(name: &str, age: i64, species: &str) -> PlannerResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::invalid("pet name cannot be empty"));
        }
        let species = species.trim();
        if species.is_empty() {
            return Err(PlannerError::invalid("pet species cannot be empty"));
        }
        let age = u32::try_from(age)
            .map_err(|_| PlannerError::invalid(format!("pet age must be a non-negative integer (got {age})")))?;
        Ok(Self {
            name: name.to_string(),
            age,
            species: species.to_lowercase(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    /// Identifier used to tag tasks belonging to this pet.
    pub fn pet_id(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    id: Uuid,
    name: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    pets: Vec<Pet>,
}

impl Owner {
    pub fn new(name: &str, email: &str, phone: Option<&str>) -> PlannerResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::invalid("owner name cannot be empty"));
        }
        let email = email.trim();
        if email.is_empty() {
            return Err(PlannerError::invalid("owner email cannot be empty"));
        }
        if !email.contains('@') {
            return Err(PlannerError::invalid(format!(
                "owner email '{email}' must be a valid email address"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.map(str::trim).filter(|p| !p.is_empty()).map(ToOwned::to_owned),
            pets: Vec::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn pets(&self) -> &[Pet] {
        &self.pets
    }

    /// Adding the same pet twice is a no-op.
    pub fn add_pet(&mut self, pet: Pet) {
        if !self.pets.contains(&pet) {
            self.pets.push(pet);
        }
    }

    pub fn remove_pet(&mut self, name: &str) -> bool {
        match self.pets.iter().position(|p| p.name() == name) {
            Some(idx) => {
                self.pets.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn pet(&self, name: &str) -> Option<&Pet> {
        self.pets.iter().find(|p| p.name() == name)
    }

    pub fn pets_by_species(&self, species: &str) -> Vec<&Pet> {
        let species = species.trim().to_lowercase();
        self.pets.iter().filter(|p| p.species() == species).collect()
    }

    pub fn pet_names(&self) -> Vec<&str> {
        self.pets.iter().map(Pet::name).collect()
    }
}

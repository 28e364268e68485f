//! Pets page: list, create, edit in place, delete.

use crate::error::{ApiError, Field};
use crate::transport::{ApiClient, Transport};
use crate::types::{NewPet, Pet, Species};

use super::{LoadTicket, ViewHandle, ViewLifetime};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetForm {
    pub name: String,
    pub species: Species,
    pub notes: String,
}

impl PetForm {
    pub fn validate(&self) -> Result<NewPet, ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::ValidationError { field: Field::PetName });
        }
        Ok(NewPet {
            name: name.to_string(),
            species: self.species,
            notes: self.notes.trim().to_string(),
        })
    }
}

impl From<&Pet> for PetForm {
    fn from(pet: &Pet) -> Self {
        Self {
            name: pet.name.clone(),
            species: pet.species,
            notes: pet.notes.clone().unwrap_or_default(),
        }
    }
}

/// A pet being edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetEdit {
    pub id: i64,
    pub form: PetForm,
}

#[derive(Debug, Default)]
pub struct PetsView {
    pub pets: Vec<Pet>,
    pub loading: bool,
    pub error: Option<String>,
    pub draft: PetForm,
    pub editing: Option<PetEdit>,
    lifetime: ViewLifetime,
}

impl PetsView {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn handle(&self) -> ViewHandle {
        self.lifetime.handle()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.loading = true;
        self.error = None;
        self.lifetime.begin_load()
    }

    pub fn apply_pets(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Vec<Pet>, ApiError>,
    ) -> bool {
        if !self.lifetime.is_current(ticket) {
            return false;
        }
        match result {
            Ok(pets) => self.pets = pets,
            Err(e) => self.error = Some(e.message_or("Failed to load pets")),
        }
        self.loading = false;
        true
    }

    pub async fn load<T: Transport>(&mut self, api: &ApiClient<T>) -> bool {
        let ticket = self.begin_load();
        match ticket.run(api.list_pets()).await {
            Some(result) => self.apply_pets(&ticket, result),
            None => false,
        }
    }

    /// Create a pet from the draft form; on success reset the form and reload.
    pub async fn create<T: Transport>(&mut self, api: &ApiClient<T>) -> bool {
        let input = match self.draft.validate() {
            Ok(input) => input,
            Err(e) => {
                self.error = Some(e.to_string());
                return false;
            }
        };
        if !self.mutate(api.create_pet(&input), "Failed to create pet").await {
            return false;
        }
        self.draft = PetForm::default();
        self.load(api).await
    }

    pub fn start_edit(&mut self, pet: &Pet) {
        self.editing = Some(PetEdit {
            id: pet.id,
            form: PetForm::from(pet),
        });
        self.error = None;
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Save the pet being edited (full replace) and reload.
    pub async fn save_edit<T: Transport>(&mut self, api: &ApiClient<T>) -> bool {
        let Some(edit) = self.editing.as_ref() else {
            return false;
        };
        let id = edit.id;
        let input = match edit.form.validate() {
            Ok(input) => input,
            Err(e) => {
                self.error = Some(e.to_string());
                return false;
            }
        };
        if !self.mutate(api.update_pet(id, &input), "Failed to update pet").await {
            return false;
        }
        self.editing = None;
        self.load(api).await
    }

    /// Delete a pet and reload. The server removes its tasks too.
    pub async fn delete<T: Transport>(&mut self, api: &ApiClient<T>, id: i64) -> bool {
        if !self.mutate(api.delete_pet(id), "Failed to delete pet").await {
            return false;
        }
        self.load(api).await
    }

    /// Run one mutation; store its failure message, or `fallback` when the
    /// server sent none. True on success.
    async fn mutate<F, R>(&mut self, fut: F, fallback: &str) -> bool
    where
        F: std::future::Future<Output = Result<R, ApiError>>,
    {
        let ticket = self.lifetime.mutation();
        let Some(result) = ticket.run(fut).await else {
            return false;
        };
        if !self.lifetime.is_mounted() {
            return false;
        }
        match result {
            Ok(_) => true,
            Err(e) => {
                self.error = Some(e.message_or(fallback));
                false
            }
        }
    }
}

//! Catalog service (shops, barbers, services, availability rules)

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        availability::{AvailabilityRule, CreateAvailabilityRule},
        barber::{Barber, CreateBarber, UpdateBarber},
        service::{CreateService, Service},
        shop::{CreateShop, Shop},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // ---- Shops ----

    pub async fn create_shop(&self, owner_id: Uuid, data: &CreateShop) -> AppResult<Shop> {
        self.repository.shops.create(owner_id, data).await
    }

    pub async fn get_shop(&self, id: Uuid) -> AppResult<Shop> {
        self.repository.shops.get_by_id(id).await
    }

    pub async fn list_shops(&self) -> AppResult<Vec<Shop>> {
        self.repository.shops.list().await
    }

    // ---- Barbers ----

    pub async fn create_barber(&self, shop_id: Uuid, data: &CreateBarber) -> AppResult<Barber> {
        // Shop must exist before hanging a barber off it.
        self.repository.shops.get_by_id(shop_id).await?;
        self.repository.barbers.create(shop_id, data).await
    }

    pub async fn get_barber(&self, id: Uuid) -> AppResult<Barber> {
        self.repository.barbers.get_by_id(id).await
    }

    pub async fn list_barbers(&self, shop_id: Uuid) -> AppResult<Vec<Barber>> {
        self.repository.barbers.list_by_shop(shop_id).await
    }

    pub async fn update_barber(&self, id: Uuid, data: &UpdateBarber) -> AppResult<Barber> {
        self.repository.barbers.update(id, data).await
    }

    // ---- Services ----

    pub async fn create_service(&self, shop_id: Uuid, data: &CreateService) -> AppResult<Service> {
        self.repository.shops.get_by_id(shop_id).await?;
        self.repository.services.create(shop_id, data).await
    }

    pub async fn list_services(&self, shop_id: Uuid) -> AppResult<Vec<Service>> {
        self.repository.services.list_by_shop(shop_id).await
    }

    pub async fn deactivate_service(&self, id: Uuid) -> AppResult<()> {
        self.repository.services.deactivate(id).await
    }

    // ---- Availability rules ----

    pub async fn list_rules(&self, barber_id: Uuid) -> AppResult<Vec<AvailabilityRule>> {
        self.repository.barbers.get_by_id(barber_id).await?;
        self.repository.availability.list_for_barber(barber_id).await
    }

    pub async fn create_rule(
        &self,
        barber_id: Uuid,
        data: &CreateAvailabilityRule,
    ) -> AppResult<AvailabilityRule> {
        self.repository.barbers.get_by_id(barber_id).await?;
        self.repository.availability.create(barber_id, data).await
    }

    pub async fn delete_rule(&self, id: Uuid) -> AppResult<()> {
        self.repository.availability.delete(id).await
    }
}

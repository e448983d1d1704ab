//! In-memory store for tests and local demos.
//!
//! Holds all state behind a single `RwLock`, so every trait method is
//! atomic with respect to the others. The compare-and-set on stock has the
//! same semantics as the conditional `UPDATE` in [`super::ProductRepository`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use filament_shop_core::{
    AddressBook, Email, NewOrder, Order, OrderId, OrderStatus, Product, ProductId, ProductInput,
    Role, UserProfile, UserProfileId, order::sort_newest_first,
};

use super::{CatalogStore, OrderPage, OrderStore, ProfileStore, RepositoryError, ShopStore};

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<ProductId, Product>,
    orders: Vec<Order>,
    profiles: Vec<UserProfile>,
}

/// A [`ShopStore`] that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with products.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            state: RwLock::new(State {
                products,
                ..State::default()
            }),
        }
    }

    /// Current stock of a product, if it exists.
    pub async fn stock_of(&self, id: &ProductId) -> Option<u32> {
        self.state.read().await.products.get(id).map(|p| p.stock)
    }

    /// Number of orders ever written.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.state.read().await.products.get(id).cloned())
    }

    async fn create_product(&self, input: ProductInput) -> Result<Product, RepositoryError> {
        let product = Product::from_input(ProductId::generate(), input);
        self.state
            .write()
            .await
            .products
            .insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: &ProductId,
        input: ProductInput,
    ) -> Result<Product, RepositoryError> {
        let mut state = self.state.write().await;
        let slot = state
            .products
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = Product::from_input(id.clone(), input);
        Ok(slot.clone())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        Ok(self.state.write().await.products.remove(id).is_some())
    }

    async fn compare_and_set_stock(
        &self,
        id: &ProductId,
        expected: u32,
        new: u32,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        match state.products.get_mut(id) {
            Some(product) if product.stock == expected => {
                product.stock = new;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let order = Order::from_new(OrderId::generate(), order);
        self.state.write().await.orders.push(order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.orders.iter().find(|o| &o.id == id).cloned())
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or(RepositoryError::NotFound)?;
        order.status = status;
        Ok(order.clone())
    }

    async fn list_orders(
        &self,
        customer_email: Option<&Email>,
        offset: u64,
        limit: u64,
    ) -> Result<OrderPage, RepositoryError> {
        let state = self.state.read().await;
        let mut matching: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| customer_email.is_none_or(|email| &o.customer_email == email))
            .cloned()
            .collect();
        sort_newest_first(&mut matching);

        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        let remaining = matching.len().saturating_sub(skip);
        let orders: Vec<Order> = matching.into_iter().skip(skip).take(take).collect();

        Ok(OrderPage {
            orders,
            next_offset: (remaining > take).then(|| offset.saturating_add(limit)),
        })
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_profile_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.profiles.iter().find(|p| &p.email == email).cloned())
    }

    async fn create_profile(
        &self,
        name: &str,
        email: &Email,
        role: Role,
    ) -> Result<UserProfile, RepositoryError> {
        let mut state = self.state.write().await;
        if state.profiles.iter().any(|p| &p.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let profile = UserProfile {
            id: UserProfileId::generate(),
            name: name.to_owned(),
            email: email.clone(),
            role,
            addresses: AddressBook::default(),
        };
        state.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn save_addresses(
        &self,
        id: &UserProfileId,
        addresses: &AddressBook,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let profile = state
            .profiles
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        profile.addresses = addresses.clone();
        Ok(())
    }
}

#[async_trait]
impl ShopStore for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use filament_shop_core::{FilamentType, Money, ShippingAddress};

    use super::*;

    fn input(name: &str, stock: u32) -> ProductInput {
        ProductInput {
            name: name.to_owned(),
            filament_type: FilamentType::Pla,
            color: "Black".to_owned(),
            hex: "#000000".to_owned(),
            price: Money::from_cents(1999),
            weight: "1kg".to_owned(),
            description: String::new(),
            image: String::new(),
            available: true,
            brand: None,
            stock,
        }
    }

    fn new_order(email: &str, minutes: i64) -> NewOrder {
        NewOrder {
            order_number: format!("ORD-{minutes}"),
            customer_name: "Test".to_owned(),
            customer_email: Email::parse(email).unwrap(),
            total: Money::ZERO,
            date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes),
            status: OrderStatus::Created,
            items: Vec::new(),
            address: ShippingAddress::FreeText(String::new()),
        }
    }

    #[tokio::test]
    async fn test_compare_and_set_stock_requires_expected_value() {
        let store = MemoryStore::new();
        let product = store.create_product(input("PLA", 5)).await.unwrap();

        assert!(!store.compare_and_set_stock(&product.id, 4, 1).await.unwrap());
        assert_eq!(store.stock_of(&product.id).await, Some(5));

        assert!(store.compare_and_set_stock(&product.id, 5, 2).await.unwrap());
        assert_eq!(store.stock_of(&product.id).await, Some(2));
    }

    #[tokio::test]
    async fn test_compare_and_set_stock_missing_product() {
        let store = MemoryStore::new();
        let missing = ProductId::new("nope");
        assert!(!store.compare_and_set_stock(&missing, 0, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_products_sorted_by_name() {
        let store = MemoryStore::new();
        store.create_product(input("Zeta", 1)).await.unwrap();
        store.create_product(input("Alpha", 1)).await.unwrap();

        let names: Vec<String> = store
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_product(&ProductId::new("nope"), input("X", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_orders_pages_newest_first() {
        let store = MemoryStore::new();
        for minutes in 0..5 {
            store
                .create_order(new_order("a@example.com", minutes))
                .await
                .unwrap();
        }
        store
            .create_order(new_order("b@example.com", 10))
            .await
            .unwrap();

        let email = Email::parse("a@example.com").unwrap();
        let first = store.list_orders(Some(&email), 0, 3).await.unwrap();
        assert_eq!(first.orders.len(), 3);
        assert_eq!(first.orders[0].order_number, "ORD-4");
        assert_eq!(first.next_offset, Some(3));

        let second = store.list_orders(Some(&email), 3, 3).await.unwrap();
        assert_eq!(second.orders.len(), 2);
        assert_eq!(second.next_offset, None);

        let all = store.list_orders(None, 0, 15).await.unwrap();
        assert_eq!(all.orders.len(), 6);
        assert_eq!(all.orders[0].order_number, "ORD-10");
    }

    #[tokio::test]
    async fn test_create_profile_twice_conflicts() {
        let store = MemoryStore::new();
        let email = Email::parse("a@example.com").unwrap();
        store.create_profile("a", &email, Role::User).await.unwrap();

        let err = store
            .create_profile("a", &email, Role::User)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}

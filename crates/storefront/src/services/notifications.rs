//! Order notifications.
//!
//! Sent after a successful checkout. Delivery is best effort: failures are
//! logged and never reach the customer's checkout result.

use std::fmt::Write as _;

use async_trait::async_trait;
use tracing::{instrument, warn};

use filament_shop_core::{Email, Order};

use super::email::{EmailClient, OutgoingEmail};

/// Receives placed orders.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Announce a placed order. Must not fail the caller.
    async fn order_placed(&self, order: &Order);
}

/// Notifier used when email is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl OrderNotifier for DisabledNotifier {
    async fn order_placed(&self, order: &Order) {
        tracing::debug!(order_number = %order.order_number, "notifications disabled, skipping");
    }
}

/// Sends an operator notice and a customer confirmation by email.
#[derive(Clone)]
pub struct EmailNotifier {
    client: EmailClient,
    from: Email,
    admin: Email,
}

impl EmailNotifier {
    #[must_use]
    pub const fn new(client: EmailClient, from: Email, admin: Email) -> Self {
        Self {
            client,
            from,
            admin,
        }
    }
}

#[async_trait]
impl OrderNotifier for EmailNotifier {
    #[instrument(skip(self, order), fields(order_number = %order.order_number))]
    async fn order_placed(&self, order: &Order) {
        let operator = operator_notice(&self.from, &self.admin, order);
        if let Err(e) = self.client.send(&operator).await {
            warn!(error = %e, "failed to send operator order notice");
        }

        let customer = customer_confirmation(&self.from, order);
        if let Err(e) = self.client.send(&customer).await {
            warn!(error = %e, "failed to send customer order confirmation");
        }
    }
}

fn operator_notice(from: &Email, admin: &Email, order: &Order) -> OutgoingEmail {
    let mut text = format!(
        "Porosi e re {} nga {} <{}>.\n\n",
        order.order_number, order.customer_name, order.customer_email
    );
    write_summary(&mut text, order);

    OutgoingEmail {
        from: from.to_string(),
        to: admin.to_string(),
        subject: format!("Porosi e re: {}", order.order_number),
        text,
    }
}

fn customer_confirmation(from: &Email, order: &Order) -> OutgoingEmail {
    let mut text = format!(
        "Përshëndetje {},\n\nFaleminderit për porosinë tuaj {}.\n\n",
        order.customer_name, order.order_number
    );
    write_summary(&mut text, order);

    OutgoingEmail {
        from: from.to_string(),
        to: order.customer_email.to_string(),
        subject: format!("Konfirmim i porosisë {}", order.order_number),
        text,
    }
}

fn write_summary(text: &mut String, order: &Order) {
    for line in &order.items {
        let _ = writeln!(
            text,
            "- {} {} ({}, {}) x{} = {}",
            line.name,
            line.filament_type,
            line.color,
            line.weight,
            line.quantity,
            line.line_total()
        );
    }
    let _ = writeln!(text, "\nTotali: {}", order.total);
    let _ = writeln!(text, "Adresa: {}", order.address);
    let _ = writeln!(text, "Statusi: {}", order.status.label());
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use filament_shop_core::{
        FilamentType, Money, OrderId, OrderLine, OrderStatus, ProductId, ShippingAddress,
    };

    use super::*;

    fn order() -> Order {
        Order {
            id: OrderId::new("o-1"),
            order_number: "ORD-1".to_owned(),
            customer_name: "Arta".to_owned(),
            customer_email: Email::parse("arta@example.com").unwrap(),
            total: Money::from_cents(1500),
            date: Utc::now(),
            status: OrderStatus::Created,
            items: vec![OrderLine {
                product_id: ProductId::new("p-1"),
                quantity: 3,
                unit_price: Money::from_cents(500),
                name: "Galaxy Black".to_owned(),
                filament_type: FilamentType::Pla,
                color: "Black".to_owned(),
                hex: "#000000".to_owned(),
                weight: "1kg".to_owned(),
            }],
            address: ShippingAddress::FreeText("Rr. Nënë Tereza 1, Prishtinë".to_owned()),
        }
    }

    #[test]
    fn test_operator_notice_goes_to_admin() {
        let from = Email::parse("shop@filament.shop").unwrap();
        let admin = Email::parse("ops@filament.shop").unwrap();
        let message = operator_notice(&from, &admin, &order());

        assert_eq!(message.to, "ops@filament.shop");
        assert_eq!(message.subject, "Porosi e re: ORD-1");
        assert!(message.text.contains("Galaxy Black PLA (Black, 1kg) x3 = €15.00"));
        assert!(message.text.contains("Totali: €15.00"));
        assert!(message.text.contains("Prishtinë"));
    }

    #[test]
    fn test_customer_confirmation_goes_to_customer() {
        let from = Email::parse("shop@filament.shop").unwrap();
        let message = customer_confirmation(&from, &order());

        assert_eq!(message.from, "shop@filament.shop");
        assert_eq!(message.to, "arta@example.com");
        assert!(message.text.starts_with("Përshëndetje Arta"));
        assert!(message.text.contains("Statusi: Krijuar"));
    }
}

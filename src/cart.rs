//! Client-side cart: the full request list edited locally, then saved wholesale.

use chrono::{Days, NaiveDate};

use crate::models::{DEFAULT_STATUS, NewServiceRequest, Service, ServiceRequestView};

#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub service_id: i64,
    pub service_name: String,
    pub order_date: NaiveDate,
    pub status: String,
    pub charged_price: f64,
    pub expected_date: NaiveDate,
}

impl From<ServiceRequestView> for CartItem {
    fn from(view: ServiceRequestView) -> Self {
        Self {
            service_id: view.service_id,
            service_name: view.service_name,
            order_date: view.order_date,
            status: view.status,
            charged_price: view.charged_price,
            expected_date: view.expected_date,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn from_requests(requests: Vec<ServiceRequestView>) -> Self {
        Self {
            items: requests.into_iter().map(CartItem::from).collect(),
        }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends a request for `service` priced at its current catalog price.
    pub fn add_service(&mut self, service: &Service, today: NaiveDate) {
        let lead_time = Days::new(service.lead_time_days.max(0) as u64);
        let expected_date = today.checked_add_days(lead_time).unwrap_or(NaiveDate::MAX);

        self.items.push(CartItem {
            service_id: service.id,
            service_name: service.name.clone(),
            order_date: today,
            status: DEFAULT_STATUS.to_string(),
            charged_price: service.price,
            expected_date,
        });
    }

    pub fn remove(&mut self, index: usize) -> Option<CartItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.charged_price).sum()
    }

    /// The list to submit when saving, in cart order.
    pub fn to_requests(&self) -> Vec<NewServiceRequest> {
        self.items
            .iter()
            .map(|item| NewServiceRequest {
                service_id: item.service_id,
                order_date: item.order_date,
                status: item.status.clone(),
                charged_price: item.charged_price,
                expected_date: item.expected_date,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn backup() -> Service {
        Service {
            id: 2,
            name: "Backup em Nuvem".to_string(),
            description: "Configuração e monitoramento de backups".to_string(),
            price: 320.0,
            lead_time_days: 5,
        }
    }

    #[test]
    fn added_service_snapshots_price_and_due_date() {
        let mut cart = Cart::default();
        cart.add_service(&backup(), date(2026, 12, 29));

        let item = &cart.items()[0];
        assert_eq!(item.service_id, 2);
        assert_eq!(item.status, DEFAULT_STATUS);
        assert_eq!(item.charged_price, 320.0);
        assert_eq!(item.order_date, date(2026, 12, 29));
        assert_eq!(item.expected_date, date(2027, 1, 3));
    }

    #[test]
    fn remove_by_position_and_total() {
        let mut cart = Cart::default();
        let today = date(2026, 10, 16);
        cart.add_service(&backup(), today);
        cart.add_service(
            &Service {
                id: 1,
                name: "Suporte Nível 1".to_string(),
                description: String::new(),
                price: 150.0,
                lead_time_days: 2,
            },
            today,
        );
        assert_eq!(cart.total(), 470.0);

        let removed = cart.remove(0).unwrap();
        assert_eq!(removed.service_id, 2);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), 150.0);
        assert!(cart.remove(5).is_none());
    }

    #[test]
    fn loaded_requests_keep_their_snapshot() {
        let cart = Cart::from_requests(vec![ServiceRequestView {
            id: 10,
            order_date: date(2026, 1, 5),
            status: "CONCLUÍDO".to_string(),
            charged_price: 99.0,
            expected_date: date(2026, 1, 7),
            service_name: "Suporte Nível 1".to_string(),
            service_id: 1,
        }]);

        let requests = cart.to_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].status, "CONCLUÍDO");
        assert_eq!(requests[0].charged_price, 99.0);
    }
}

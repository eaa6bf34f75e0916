use std::collections::BTreeSet;

use tokio::sync::RwLock;

use concierge_core::domain::booking::{BookingRecord, CustomerRecord, FlightRecord};
use concierge_core::domain::business::{BusinessFilter, BusinessRecord, NewBusiness};
use concierge_core::domain::conference::ConferenceSession;
use concierge_core::domain::context::{ConversationContext, UserDetails};

use super::{
    context_from_account, context_from_user, BookingRepository, BusinessRepository,
    ContextStore, CustomerRepository, FlightRepository, RepositoryError, ScheduleRepository,
    UserRepository,
};

/// Every record table held in memory. Bookings keep their joined customer and flight.
#[derive(Default)]
pub struct InMemoryRecordStore {
    users: RwLock<Vec<UserDetails>>,
    customers: RwLock<Vec<CustomerRecord>>,
    flights: RwLock<Vec<FlightRecord>>,
    bookings: RwLock<Vec<BookingRecord>>,
    sessions: RwLock<Vec<ConferenceSession>>,
    businesses: RwLock<Vec<BusinessRecord>>,
}

impl InMemoryRecordStore {
    pub fn with_user(mut self, user: UserDetails) -> Self {
        self.users.get_mut().push(user);
        self
    }

    pub fn with_customer(mut self, customer: CustomerRecord) -> Self {
        self.customers.get_mut().push(customer);
        self
    }

    pub fn with_flight(mut self, flight: FlightRecord) -> Self {
        self.flights.get_mut().push(flight);
        self
    }

    pub fn with_booking(mut self, booking: BookingRecord) -> Self {
        self.bookings.get_mut().push(booking);
        self
    }

    pub fn with_session(mut self, session: ConferenceSession) -> Self {
        self.sessions.get_mut().push(session);
        self
    }

    pub fn with_business(mut self, business: BusinessRecord) -> Self {
        self.businesses.get_mut().push(business);
        self
    }

    async fn distinct_session_values(
        &self,
        pick: impl Fn(&ConferenceSession) -> Option<&String>,
    ) -> Vec<String> {
        let sessions = self.sessions.read().await;
        sessions
            .iter()
            .filter_map(|session| pick(session))
            .filter(|value| !value.trim().is_empty())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    async fn owner_name(&self, user_id: Option<&str>) -> Option<String> {
        let user_id = user_id?;
        let users = self.users.read().await;
        users
            .iter()
            .find(|user| user.user_id.as_deref() == Some(user_id))
            .and_then(|user| user.user_name.clone())
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryRecordStore {
    async fn find_by_registration_id(
        &self,
        registration_id: &str,
    ) -> Result<Option<UserDetails>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.registration_id.as_deref() == Some(registration_id)).cloned())
    }
}

#[async_trait::async_trait]
impl CustomerRepository for InMemoryRecordStore {
    async fn find_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<CustomerRecord>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers
            .iter()
            .find(|customer| customer.account_number.as_deref() == Some(account_number))
            .cloned())
    }
}

#[async_trait::async_trait]
impl BookingRepository for InMemoryRecordStore {
    async fn find_by_confirmation(
        &self,
        confirmation_number: &str,
    ) -> Result<Option<BookingRecord>, RepositoryError> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .iter()
            .find(|booking| booking.confirmation_number.eq_ignore_ascii_case(confirmation_number))
            .cloned())
    }

    async fn list_for_customer(
        &self,
        customer_id: i64,
    ) -> Result<Vec<BookingRecord>, RepositoryError> {
        let bookings = self.bookings.read().await;
        let mut listed: Vec<_> = bookings
            .iter()
            .filter(|booking| booking.customer_id == Some(customer_id))
            .cloned()
            .collect();
        listed.sort_by_key(|booking| booking.id);
        Ok(listed)
    }

    async fn update_seat(
        &self,
        confirmation_number: &str,
        seat_number: &str,
    ) -> Result<bool, RepositoryError> {
        let mut bookings = self.bookings.write().await;
        let Some(booking) = bookings
            .iter_mut()
            .find(|booking| booking.confirmation_number.eq_ignore_ascii_case(confirmation_number))
        else {
            return Ok(false);
        };
        booking.seat_number = Some(seat_number.to_string());
        Ok(true)
    }

    async fn update_status(
        &self,
        confirmation_number: &str,
        booking_status: &str,
    ) -> Result<bool, RepositoryError> {
        let mut bookings = self.bookings.write().await;
        let Some(booking) = bookings
            .iter_mut()
            .find(|booking| booking.confirmation_number.eq_ignore_ascii_case(confirmation_number))
        else {
            return Ok(false);
        };
        booking.booking_status = Some(booking_status.to_string());
        Ok(true)
    }
}

#[async_trait::async_trait]
impl FlightRepository for InMemoryRecordStore {
    async fn find_by_number(
        &self,
        flight_number: &str,
    ) -> Result<Option<FlightRecord>, RepositoryError> {
        let flights = self.flights.read().await;
        Ok(flights
            .iter()
            .find(|flight| flight.flight_number.eq_ignore_ascii_case(flight_number))
            .cloned())
    }
}

#[async_trait::async_trait]
impl ScheduleRepository for InMemoryRecordStore {
    async fn list_sessions(&self, limit: u32) -> Result<Vec<ConferenceSession>, RepositoryError> {
        let sessions = self.sessions.read().await;
        let mut ordered = sessions.clone();
        ordered.sort_by(|left, right| {
            (&left.conference_date, &left.start_time, left.id).cmp(&(
                &right.conference_date,
                &right.start_time,
                right.id,
            ))
        });
        ordered.truncate(limit as usize);
        Ok(ordered)
    }

    async fn list_speakers(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self.distinct_session_values(|session| session.speaker_name.as_ref()).await)
    }

    async fn list_tracks(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self.distinct_session_values(|session| session.track_name.as_ref()).await)
    }

    async fn list_rooms(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self.distinct_session_values(|session| session.conference_room_name.as_ref()).await)
    }
}

#[async_trait::async_trait]
impl BusinessRepository for InMemoryRecordStore {
    async fn search(&self, filter: &BusinessFilter) -> Result<Vec<BusinessRecord>, RepositoryError> {
        let businesses = self.businesses.read().await;
        Ok(businesses
            .iter()
            .filter(|business| business.is_active && business.matches(filter))
            .cloned()
            .collect())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<BusinessRecord>, RepositoryError> {
        let businesses = self.businesses.read().await;
        Ok(businesses
            .iter()
            .filter(|business| business.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect())
    }

    async fn insert(&self, business: NewBusiness) -> Result<BusinessRecord, RepositoryError> {
        let owner_name = self.owner_name(business.user_id.as_deref()).await;
        let mut businesses = self.businesses.write().await;
        let id = businesses.iter().map(|existing| existing.id).max().unwrap_or(0) + 1;
        let record = BusinessRecord {
            id,
            user_id: business.user_id,
            organization_id: business.organization_id,
            owner_name,
            details: business.details,
            is_active: true,
        };
        businesses.push(record.clone());
        Ok(record)
    }
}

#[async_trait::async_trait]
impl ContextStore for InMemoryRecordStore {
    async fn lookup_by_registration_id(
        &self,
        registration_id: &str,
    ) -> Result<Option<ConversationContext>, RepositoryError> {
        Ok(self.find_by_registration_id(registration_id).await?.map(context_from_user))
    }

    async fn lookup_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<ConversationContext>, RepositoryError> {
        let Some(customer) = self.find_by_account_number(account_number).await? else {
            return Ok(None);
        };
        let bookings = self.list_for_customer(customer.id).await?;
        Ok(Some(context_from_account(customer, &bookings)))
    }
}

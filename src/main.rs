use aerosurety::utils::{current_time, hours_from_now};
use aerosurety::{
    AccountId, FlightKey, FlightStatus, OracleWorker, SuretyApp, SuretyConfig,
};
use log::{info, warn};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const ORACLE_COUNT: u64 = 20;
const PASSENGER_COUNT: u64 = 5;

// Demo account layout: owner 0, airlines 1..=4, passengers 50.., oracles 100..
fn owner() -> AccountId {
    AccountId::from_low_u64(0)
}

// Set up the airline side: admit and fund a handful of airlines
fn init_airlines(app: &SuretyApp) -> Vec<AccountId> {
    info!("Registering and funding airlines...");
    let min_funding = app.config().min_airline_funding;
    let first = AccountId::from_low_u64(1);
    app.fund_airline(first, min_funding)
        .expect("funding the first airline");

    let mut airlines = vec![first];
    for n in 2..=4 {
        let airline = AccountId::from_low_u64(n);
        app.register_airline(airline, first)
            .expect("registering airline");
        app.fund_airline(airline, min_funding)
            .expect("funding airline");
        airlines.push(airline);
    }
    airlines
}

// Offer a flight per airline, departing a few hours from now
fn init_flights(app: &SuretyApp, airlines: &[AccountId]) -> Vec<FlightKey> {
    info!("Registering flights...");
    let mut flights = Vec::new();
    for (i, airline) in airlines.iter().enumerate() {
        let code = format!("ND13{:02}", i);
        let timestamp = hours_from_now(2 + i as u64);
        app.register_flight(owner(), &code, FlightStatus::Unknown, timestamp, *airline)
            .expect("registering flight");
        flights.push(FlightKey::new(*airline, &code, timestamp));
    }
    flights
}

// Passengers insure the first flight
fn init_policies(app: &SuretyApp, flight: &FlightKey) {
    info!("Selling policies for flight {}...", flight);
    let max_premium = app.config().max_premium;
    for n in 0..PASSENGER_COUNT {
        let passenger = AccountId::from_low_u64(50 + n);
        app.buy(passenger, flight, max_premium)
            .expect("buying policy");
    }
}

// Spawn the oracle worker fleet. Half the fleet is scripted to report an
// airline-caused delay so the demo reliably reaches quorum; the rest answer
// randomly, the way independent witnesses would.
fn init_oracles(app: &Arc<SuretyApp>) -> Vec<thread::JoinHandle<()>> {
    info!("Registering {} oracle workers...", ORACLE_COUNT);
    let mut handles = Vec::new();
    for n in 0..ORACLE_COUNT {
        let id = AccountId::from_low_u64(100 + n);
        let scripted = if n % 2 == 0 {
            Some(FlightStatus::LateAirline)
        } else {
            None
        };
        let events = app.subscribe();
        let worker = OracleWorker::register_scripted(app, id, scripted)
            .expect("registering oracle worker");
        let app = Arc::clone(app);
        handles.push(thread::spawn(move || worker.run(&app, events)));
    }
    handles
}

// Keep requesting until the oracle fleet settles the flight's status
fn resolve_flight(app: &SuretyApp, flight: &FlightKey) -> Option<FlightStatus> {
    for round in 1..=20 {
        let index = app
            .fetch_flight_status(owner(), flight.airline, &flight.flight, flight.timestamp)
            .expect("requesting flight status");
        info!("Request round {} opened at index {}", round, index);
        thread::sleep(Duration::from_millis(200));

        match app.flight_status(flight) {
            Some(FlightStatus::Unknown) | None => continue,
            resolved => return resolved,
        }
    }
    None
}

fn main() {
    env_logger::init();

    info!("Starting aerosurety demo node at {}", current_time());
    let first_airline = AccountId::from_low_u64(1);
    let app = Arc::new(
        SuretyApp::with_config(owner(), first_airline, SuretyConfig::default())
            .expect("default configuration is valid"),
    );

    let airlines = init_airlines(&app);
    let flights = init_flights(&app, &airlines);
    init_policies(&app, &flights[0]);
    let _workers = init_oracles(&app);

    match resolve_flight(&app, &flights[0]) {
        Some(status) => info!("Flight {} settled as {:?}", flights[0], status),
        None => warn!("Oracle fleet never reached quorum for {}", flights[0]),
    }

    for n in 0..PASSENGER_COUNT {
        let passenger = AccountId::from_low_u64(50 + n);
        let credit = app.get_credit(passenger);
        let released = app.withdraw(passenger).expect("withdrawing credit");
        info!(
            "Passenger {} had {} credited, {} released",
            passenger, credit, released
        );
    }

    info!("aerosurety demo node shutting down");
}

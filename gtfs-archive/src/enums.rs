use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Reads an integer-coded GTFS value.
///
/// Empty cells never reach this function: the containing field is an [Option] and the
/// row deserializer maps an empty cell to `None` before asking for the value.
fn integer_code<'de, D>(deserializer: D, what: &str) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    s.parse().map_err(|_| {
        de::Error::custom(format!(
            "invalid value for {}, must be an integer: {}",
            what, s
        ))
    })
}

/// Describes the kind of [crate::Stop]. See <https://gtfs.org/reference/static/#stopstxt> `location_type`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LocationType {
    /// Stop (or Platform). A location where passengers board or disembark from a transit vehicle
    StopPoint,
    /// Station. A physical structure or area that contains one or more platform
    StopArea,
    /// A location where passengers can enter or exit a station from the street
    StationEntrance,
    /// A location within a station, not matching any other `location_type`
    GenericNode,
    /// A specific location on a platform, where passengers can board and/or alight vehicles
    BoardingArea,
    /// An unknown value
    Unknown(i32),
}

impl<'de> Deserialize<'de> for LocationType {
    fn deserialize<D>(deserializer: D) -> Result<LocationType, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match integer_code(deserializer, "LocationType")? {
            0 => LocationType::StopPoint,
            1 => LocationType::StopArea,
            2 => LocationType::StationEntrance,
            3 => LocationType::GenericNode,
            4 => LocationType::BoardingArea,
            i => LocationType::Unknown(i),
        })
    }
}

/// Describes the kind of [crate::Route]. See <https://gtfs.org/reference/static/#routestxt> `route_type`
///
/// Some route types are extended GTFS (<https://developers.google.com/transit/gtfs/reference/extended-route-types>)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RouteType {
    /// Tram, Streetcar, Light rail. Any light rail or street level system within a metropolitan area
    Tramway,
    /// Subway, Metro. Any underground rail system within a metropolitan area
    Subway,
    /// Used for intercity or long-distance travel
    Rail,
    /// Used for short- and long-distance bus routes
    Bus,
    /// Used for short- and long-distance boat service
    Ferry,
    /// Used for street-level rail cars where the cable runs beneath the vehicle
    CableCar,
    /// Aerial lift, suspended cable car (e.g., gondola lift, aerial tramway)
    Gondola,
    /// Any rail system designed for steep inclines
    Funicular,
    /// (extended) Used for intercity bus services
    Coach,
    /// (extended) Airplanes
    Air,
    /// (extended) Taxi, Cab
    Taxi,
    /// (extended) any other value
    Other(i32),
}

impl<'de> Deserialize<'de> for RouteType {
    fn deserialize<D>(deserializer: D) -> Result<RouteType, D::Error>
    where
        D: Deserializer<'de>,
    {
        let i = integer_code(deserializer, "RouteType")?;

        let hundreds = i / 100;
        Ok(match (i, hundreds) {
            (0, _) | (_, 9) => RouteType::Tramway,
            (1, _) | (_, 4) => RouteType::Subway,
            (2, _) | (_, 1) => RouteType::Rail,
            (3, _) | (_, 7) | (_, 8) => RouteType::Bus,
            (4, _) | (_, 10) | (_, 12) => RouteType::Ferry,
            (5, _) => RouteType::CableCar,
            (6, _) | (_, 13) => RouteType::Gondola,
            (7, _) | (_, 14) => RouteType::Funicular,
            (_, 2) => RouteType::Coach,
            (_, 11) => RouteType::Air,
            (_, 15) => RouteType::Taxi,
            _ => RouteType::Other(i),
        })
    }
}

/// Describes if and how a traveller can board or alight the vehicle. See <https://gtfs.org/reference/static/#stop_timestxt> `pickup_type` and `drop_off_type`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PickupDropOffType {
    /// Regularly scheduled pickup or drop off
    Regular,
    /// No pickup or drop off available
    NotAvailable,
    /// Must phone agency to arrange pickup or drop off
    ArrangeByPhone,
    /// Must coordinate with driver to arrange pickup or drop off
    CoordinateWithDriver,
    /// An unknown value not in the GTFS reference
    Unknown(i32),
}

impl<'de> Deserialize<'de> for PickupDropOffType {
    fn deserialize<D>(deserializer: D) -> Result<PickupDropOffType, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match integer_code(deserializer, "PickupDropOffType")? {
            0 => PickupDropOffType::Regular,
            1 => PickupDropOffType::NotAvailable,
            2 => PickupDropOffType::ArrangeByPhone,
            3 => PickupDropOffType::CoordinateWithDriver,
            i => PickupDropOffType::Unknown(i),
        })
    }
}

/// Indicates whether a rider can board or alight anywhere along the vehicle’s travel path
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContinuousPickupDropOff {
    /// Continuous stopping pickup or drop off
    Continuous,
    /// No continuous stopping pickup or drop off
    NotAvailable,
    /// Must phone an agency to arrange continuous stopping pickup or drop off
    ArrangeByPhone,
    /// Must coordinate with a driver to arrange continuous stopping pickup or drop off
    CoordinateWithDriver,
    /// An unknown value not in the GTFS reference
    Unknown(i32),
}

impl<'de> Deserialize<'de> for ContinuousPickupDropOff {
    fn deserialize<D>(deserializer: D) -> Result<ContinuousPickupDropOff, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match integer_code(deserializer, "ContinuousPickupDropOff")? {
            0 => ContinuousPickupDropOff::Continuous,
            1 => ContinuousPickupDropOff::NotAvailable,
            2 => ContinuousPickupDropOff::ArrangeByPhone,
            3 => ContinuousPickupDropOff::CoordinateWithDriver,
            i => ContinuousPickupDropOff::Unknown(i),
        })
    }
}

/// Describes if the stop time is exact or not. See <https://gtfs.org/reference/static/#stop_timestxt> `timepoint`
#[derive(Debug, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum TimepointType {
    /// Times are considered approximate
    #[serde(rename = "0")]
    Approximate,
    /// Times are considered exact
    #[serde(rename = "1")]
    Exact,
}

/// Generic enum to define if a service (like wheelchair boarding) is available
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Availability {
    /// No information if the service is available
    InformationNotAvailable,
    /// The service is available
    Available,
    /// The service is not available
    NotAvailable,
    /// An unknown value not in the GTFS reference
    Unknown(i32),
}

impl<'de> Deserialize<'de> for Availability {
    fn deserialize<D>(deserializer: D) -> Result<Availability, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match integer_code(deserializer, "Availability")? {
            0 => Availability::InformationNotAvailable,
            1 => Availability::Available,
            2 => Availability::NotAvailable,
            i => Availability::Unknown(i),
        })
    }
}

/// Defines if a [crate::CalendarDate] is added or deleted from a [crate::Calendar]
#[derive(Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Exception {
    /// There will be a service on that day
    #[serde(rename = "1")]
    Added,
    /// There won’t be a service on that day
    #[serde(rename = "2")]
    Deleted,
}

/// Defines the direction of a [crate::Trip], only for display, not for routing. See <https://gtfs.org/reference/static/#tripstxt> `direction_id`
#[derive(Debug, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DirectionType {
    /// Travel in one direction (e.g. outbound travel).
    #[serde(rename = "0")]
    Outbound,
    /// Travel in the opposite direction (e.g. inbound travel).
    #[serde(rename = "1")]
    Inbound,
}

/// Defines if the [crate::Frequency] is exact (the vehicle runs exactly every n minutes) or not
#[derive(Debug, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum ExactTimes {
    /// Frequency-based trips
    #[serde(rename = "0")]
    FrequencyBased,
    /// Schedule-based trips with the exact same headway throughout the day.
    #[serde(rename = "1")]
    ScheduleBased,
}

/// Defines the type of a [crate::Transfer]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransferType {
    /// Recommended transfer point between routes
    Recommended,
    /// Departing vehicle waits for arriving one
    Timed,
    /// Transfer requires a minimum amount of time between arrival and departure to ensure a connection.
    MinTime,
    /// Transfer is not possible at this location
    Impossible,
    /// An unknown value not in the GTFS reference
    Unknown(i32),
}

impl<'de> Deserialize<'de> for TransferType {
    fn deserialize<D>(deserializer: D) -> Result<TransferType, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match integer_code(deserializer, "TransferType")? {
            0 => TransferType::Recommended,
            1 => TransferType::Timed,
            2 => TransferType::MinTime,
            3 => TransferType::Impossible,
            i => TransferType::Unknown(i),
        })
    }
}

pub use crate::enums::*;
use crate::serde_helpers::*;
use chrono::{Datelike, NaiveDate, Weekday};
use rgb::RGB8;
use serde::Deserialize;

use std::fmt;

/// A calender describes on which days the vehicle runs. See <https://gtfs.org/reference/static/#calendartxt>
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Calendar {
    /// Unique technical identifier (not for the traveller) of this calendar
    #[serde(rename = "service_id")]
    pub id: String,
    /// Does the service run on mondays
    #[serde(deserialize_with = "deserialize_bool")]
    pub monday: bool,
    /// Does the service run on tuesdays
    #[serde(deserialize_with = "deserialize_bool")]
    pub tuesday: bool,
    /// Does the service run on wednesdays
    #[serde(deserialize_with = "deserialize_bool")]
    pub wednesday: bool,
    /// Does the service run on thursdays
    #[serde(deserialize_with = "deserialize_bool")]
    pub thursday: bool,
    /// Does the service run on fridays
    #[serde(deserialize_with = "deserialize_bool")]
    pub friday: bool,
    /// Does the service run on saturdays
    #[serde(deserialize_with = "deserialize_bool")]
    pub saturday: bool,
    /// Does the service run on sundays
    #[serde(deserialize_with = "deserialize_bool")]
    pub sunday: bool,
    /// Start service day for the service interval
    #[serde(deserialize_with = "deserialize_date")]
    pub start_date: NaiveDate,
    /// End service day for the service interval. This service day is included in the interval
    #[serde(deserialize_with = "deserialize_date")]
    pub end_date: NaiveDate,
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}–{}", self.start_date, self.end_date)
    }
}

impl Calendar {
    /// Returns true if there is a service running on that day
    pub fn valid_weekday(&self, date: NaiveDate) -> bool {
        match date.weekday() {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}

/// Defines a specific date that can be added or removed from a [Calendar]. See <https://gtfs.org/reference/static/#calendar_datestxt>
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CalendarDate {
    /// Identifier of the service that is modified at this date
    pub service_id: String,
    #[serde(deserialize_with = "deserialize_date")]
    /// Date where the service will be added or deleted
    pub date: NaiveDate,
    /// Is the service added or deleted
    pub exception_type: Exception,
}

/// A physical stop, station or area. See <https://gtfs.org/reference/static/#stopstxt>
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Stop {
    /// Unique technical identifier (not for the traveller) of the stop
    #[serde(rename = "stop_id")]
    pub id: String,
    /// Short text or a number that identifies the location for riders
    #[serde(rename = "stop_code")]
    pub code: Option<String>,
    /// Name of the location. Use a name that people will understand in the local and tourist vernacular
    #[serde(rename = "stop_name")]
    pub name: Option<String>,
    /// Description of the location that provides useful, quality information
    #[serde(rename = "stop_desc")]
    pub description: Option<String>,
    /// Latitude of the stop
    #[serde(rename = "stop_lat")]
    pub latitude: Option<f64>,
    /// Longitude of the stop
    #[serde(rename = "stop_lon")]
    pub longitude: Option<f64>,
    /// Identifies the fare zone for a stop
    pub zone_id: Option<String>,
    /// URL of a web page about the location
    #[serde(rename = "stop_url")]
    pub url: Option<String>,
    /// Type of the location
    pub location_type: Option<LocationType>,
    /// Defines hierarchy between the different locations
    pub parent_station: Option<String>,
    /// Timezone of the location
    #[serde(rename = "stop_timezone")]
    pub timezone: Option<String>,
    /// Indicates whether wheelchair boardings are possible from the location
    pub wheelchair_boarding: Option<Availability>,
    /// Level of the location
    pub level_id: Option<String>,
    /// Platform identifier for a platform stop (a stop belonging to a station)
    pub platform_code: Option<String>,
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name.as_deref().unwrap_or(&self.id))
    }
}

/// A [StopTime] is when a [Trip] passes at a certain [Stop]. See <https://gtfs.org/reference/static/#stop_timestxt>
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StopTime {
    /// Identifies a trip
    pub trip_id: String,
    /// Arrival time of the stop time, in seconds since the beginning of the service day.
    /// It's an option since the intermediate stops can have no arrival
    #[serde(default, deserialize_with = "deserialize_optional_time")]
    pub arrival_time: Option<u32>,
    /// Departure time of the stop time, in seconds since the beginning of the service day
    #[serde(default, deserialize_with = "deserialize_optional_time")]
    pub departure_time: Option<u32>,
    /// Identifier of the [Stop] where the vehicle stops
    pub stop_id: String,
    /// Order of stops for a particular trip. The values must increase along the trip but do not need to be consecutive
    pub stop_sequence: u32,
    /// Text that appears on signage identifying the trip's destination to riders
    pub stop_headsign: Option<String>,
    /// Indicates pickup method
    pub pickup_type: Option<PickupDropOffType>,
    /// Indicates drop off method
    pub drop_off_type: Option<PickupDropOffType>,
    /// Indicates whether a rider can board the transit vehicle anywhere along the vehicle’s travel path
    pub continuous_pickup: Option<ContinuousPickupDropOff>,
    /// Indicates whether a rider can alight from the transit vehicle at any point along the vehicle’s travel path
    pub continuous_drop_off: Option<ContinuousPickupDropOff>,
    /// Actual distance traveled along the associated shape, from the first stop to the stop specified in this record
    pub shape_dist_traveled: Option<f32>,
    /// Indicates if arrival and departure times for a stop are strictly adhered to by the vehicle or if they are instead approximate
    pub timepoint: Option<TimepointType>,
}

/// A route is a commercial line (there can be various stop sequences for a same line). See <https://gtfs.org/reference/static/#routestxt>
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Route {
    /// Unique technical (not for the traveller) identifier for the route
    #[serde(rename = "route_id")]
    pub id: String,
    /// Short name of a route. This will often be a short, abstract identifier like "32", "100X", or "Green"
    #[serde(rename = "route_short_name")]
    pub short_name: Option<String>,
    /// Full name of a route. This name is generally more descriptive than the [Route::short_name]
    #[serde(rename = "route_long_name")]
    pub long_name: Option<String>,
    /// Description of a route that provides useful, quality information
    #[serde(rename = "route_desc")]
    pub desc: Option<String>,
    /// Indicates the type of transportation used on a route
    pub route_type: RouteType,
    /// URL of a web page about the particular route
    #[serde(rename = "route_url")]
    pub url: Option<String>,
    /// Agency for the specified route
    pub agency_id: Option<String>,
    /// Orders the routes in a way which is ideal for presentation to customers. Routes with smaller route_sort_order values should be displayed first.
    #[serde(rename = "route_sort_order")]
    pub order: Option<u32>,
    /// Route color designation that matches public facing material
    #[serde(
        rename = "route_color",
        default,
        deserialize_with = "deserialize_option_color"
    )]
    pub color: Option<RGB8>,
    /// Legible color to use for text drawn against a background of [Route::color]
    #[serde(
        rename = "route_text_color",
        default,
        deserialize_with = "deserialize_option_color"
    )]
    pub text_color: Option<RGB8>,
    /// Indicates whether a rider can board the transit vehicle anywhere along the vehicle’s travel path
    pub continuous_pickup: Option<ContinuousPickupDropOff>,
    /// Indicates whether a rider can alight from the transit vehicle at any point along the vehicle’s travel path
    pub continuous_drop_off: Option<ContinuousPickupDropOff>,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.long_name, &self.short_name) {
            (Some(long_name), _) => write!(f, "{}", long_name),
            (None, Some(short_name)) => write!(f, "{}", short_name),
            (None, None) => write!(f, "{}", self.id),
        }
    }
}

/// A [Trip] is a vehicle that follows a sequence of [StopTime] on certain days. See <https://gtfs.org/reference/static/#tripstxt>
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Trip {
    /// Unique technical identifier (not for the traveller) for the Trip
    #[serde(rename = "trip_id")]
    pub id: String,
    /// References the [Calendar] on which this trip runs
    pub service_id: String,
    /// References along which [Route] this trip runs
    pub route_id: String,
    /// Shape of the trip
    pub shape_id: Option<String>,
    /// Text that appears on signage identifying the trip's destination to riders
    pub trip_headsign: Option<String>,
    /// Public facing text used to identify the trip to riders, for instance, to identify train numbers for commuter rail trips
    pub trip_short_name: Option<String>,
    /// Indicates the direction of travel for a trip. This field is not used in routing; it provides a way to separate trips by direction when publishing time tables
    pub direction_id: Option<DirectionType>,
    /// Identifies the block to which the trip belongs. A block consists of a single trip or many sequential trips made using the same vehicle
    pub block_id: Option<String>,
    /// Indicates wheelchair accessibility
    pub wheelchair_accessible: Option<Availability>,
    /// Indicates whether bikes are allowed
    pub bikes_allowed: Option<Availability>,
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "route id: {}, service id: {}",
            self.route_id, self.service_id
        )
    }
}

/// General informations about the agency running the network. See <https://gtfs.org/reference/static/#agencytxt>
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Agency {
    /// Unique technical (not for the traveller) identifier for the Agency
    #[serde(rename = "agency_id")]
    pub id: Option<String>,
    /// Full name of the transit agency
    #[serde(rename = "agency_name")]
    pub name: String,
    /// Full url of the transit agency.
    #[serde(rename = "agency_url")]
    pub url: String,
    /// Timezone where the transit agency is located
    #[serde(rename = "agency_timezone")]
    pub timezone: String,
    /// Primary language used by this transit agency
    #[serde(rename = "agency_lang")]
    pub lang: Option<String>,
    /// A voice telephone number for the specified agency
    #[serde(rename = "agency_phone")]
    pub phone: Option<String>,
    /// URL of a web page that allows a rider to purchase tickets or other fare instruments for that agency online
    #[serde(rename = "agency_fare_url")]
    pub fare_url: Option<String>,
    /// Email address actively monitored by the agency’s customer service department
    #[serde(rename = "agency_email")]
    pub email: Option<String>,
}

impl fmt::Display for Agency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A single geographical point describing the shape of a [Trip]. See <https://gtfs.org/reference/static/#shapestxt>
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ShapePoint {
    /// Identifier of the shape
    #[serde(rename = "shape_id")]
    pub id: String,
    #[serde(rename = "shape_pt_lat")]
    /// Latitude of a shape point
    pub latitude: f64,
    /// Longitude of a shape point
    #[serde(rename = "shape_pt_lon")]
    pub longitude: f64,
    /// Sequence in which the shape points connect to form the shape. Values increase along the trip but do not need to be consecutive.
    #[serde(rename = "shape_pt_sequence")]
    pub sequence: u32,
    /// Actual distance traveled along the shape from the first shape point to the point specified in this record. Used by trip planners to show the correct portion of the shape on a map
    #[serde(rename = "shape_dist_traveled")]
    pub dist_traveled: Option<f32>,
}

/// Timetables can be defined by the frequency of their vehicles. See <<https://gtfs.org/reference/static/#frequenciestxt>>
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Frequency {
    /// References the [Trip] that uses frequency
    pub trip_id: String,
    /// Time at which the first vehicle departs from the first stop of the trip
    #[serde(deserialize_with = "deserialize_time")]
    pub start_time: u32,
    /// Time at which service changes to a different headway (or ceases) at the first stop in the trip
    #[serde(deserialize_with = "deserialize_time")]
    pub end_time: u32,
    /// Time, in seconds, between departures from the same stop (headway) for the trip, during the time interval specified by start_time and end_time
    pub headway_secs: u32,
    /// Indicates the type of service for a trip
    pub exact_times: Option<ExactTimes>,
}

/// Transfer information between stops. See <https://gtfs.org/reference/static/#transferstxt>
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Transfer {
    /// Stop from which to leave
    pub from_stop_id: String,
    /// Stop which to transfer to
    pub to_stop_id: String,
    /// Route from which to leave
    pub from_route_id: Option<String>,
    /// Route which to transfer to
    pub to_route_id: Option<String>,
    /// Trip from which to leave
    pub from_trip_id: Option<String>,
    /// Trip which to transfer to
    pub to_trip_id: Option<String>,
    /// Type of the transfer
    pub transfer_type: Option<TransferType>,
    /// Minimum time needed to make the transfer in seconds
    pub min_transfer_time: Option<u32>,
}

/// Meta-data about the feed. See <https://gtfs.org/reference/static/#feed_infotxt>
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FeedInfo {
    /// Full name of the organization that publishes the dataset.
    #[serde(rename = "feed_publisher_name")]
    pub name: String,
    /// URL of the dataset publishing organization's website
    #[serde(rename = "feed_publisher_url")]
    pub url: String,
    /// Default language used for the text in this dataset
    #[serde(rename = "feed_lang")]
    pub lang: String,
    /// Defines the language that should be used when the data consumer doesn’t know the language of the rider
    pub default_lang: Option<String>,
    /// The dataset provides complete and reliable schedule information for service in the period from this date
    #[serde(
        rename = "feed_start_date",
        default,
        deserialize_with = "deserialize_option_date"
    )]
    pub start_date: Option<NaiveDate>,
    /// The dataset provides complete and reliable schedule information for service in the period until this date
    #[serde(
        rename = "feed_end_date",
        default,
        deserialize_with = "deserialize_option_date"
    )]
    pub end_date: Option<NaiveDate>,
    /// String that indicates the current version of their GTFS dataset
    #[serde(rename = "feed_version")]
    pub version: Option<String>,
    /// Email address for communication regarding the GTFS dataset and data publishing practices
    #[serde(rename = "feed_contact_email")]
    pub contact_email: Option<String>,
    /// URL for contact information, a web-form, support desk, or other tools for communication regarding the GTFS dataset and data publishing practices
    #[serde(rename = "feed_contact_url")]
    pub contact_url: Option<String>,
}

impl fmt::Display for FeedInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Human readable direction of the trips of a route, from the GTFS+ `directions.txt` extension
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Direction {
    /// The [Route] described
    pub route_id: String,
    /// Matches the [Trip::direction_id] of the trips of the route
    pub direction_id: Option<DirectionType>,
    /// Compass direction, like `North` or `Southwest`
    pub direction: String,
}

impl Direction {
    /// Short compass form of the direction.
    ///
    /// With `adjective`, the bound form is given (`NB`, `SB`…), otherwise a single letter.
    /// Intermediate directions keep their north/south component. Anything that is not a compass
    /// direction gives an empty string.
    pub fn cardinal_abbreviation(&self, adjective: bool) -> &'static str {
        let abbreviation = match self.direction.to_lowercase().as_str() {
            "north" | "northeast" | "northwest" => ("N", "NB"),
            "south" | "southeast" | "southwest" => ("S", "SB"),
            "west" => ("W", "WB"),
            "east" => ("E", "EB"),
            _ => ("", ""),
        };
        if adjective {
            abbreviation.1
        } else {
            abbreviation.0
        }
    }

    /// `Outbound` for direction `0`, `Inbound` otherwise
    pub fn bound_direction(&self) -> &'static str {
        match self.direction_id {
            Some(DirectionType::Outbound) => "Outbound",
            _ => "Inbound",
        }
    }
}

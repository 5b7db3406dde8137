//! Route summary

/// GET /help
pub async fn help() -> &'static str {
    HELP_TEXT
}

const HELP_TEXT: &str = "\
Seismo earthquake API

Data
  POST   /data                                Load earthquake data from the USGS feed
  DELETE /data                                Delete all earthquake data

Queries
  GET    /quakes                              List all earthquake IDs
  GET    /quakes/<id>                         Get one earthquake feature
  GET    /quakes/range?start=&end=            Earthquakes between two dates (YYYY-MM-DD)
  GET    /quakes/magnitude?min=&max=          Earthquakes by magnitude range
  GET    /quakes/depth?min=&max=              Earthquakes by depth range (km)
  GET    /quakes/nearby?lon=&lat=&radius_km=  Earthquakes within a radius of a point
  GET    /quakes/stats?start=&end=            Magnitude, depth and magType summary

Jobs
  POST   /jobs                                Submit a new job {\"start\", \"end\", \"type\"}
                                              types: magnitude_distribution, earthquake_count_by_city
  GET    /jobs                                List all job IDs
  GET    /jobs/stats                          Job counts by status
  GET    /jobs/<id>                           Get job status
  GET    /results/<id>                        Get job result (JSON or PNG)

Misc
  GET    /health                              Health check
  GET    /help                                This message
";

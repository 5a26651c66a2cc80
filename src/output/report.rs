use crate::map::{MapView, TILE_ATTRIBUTION, TILE_URL};

fn json_for_script_tag(value: &str) -> String {
    value.replace("</", "<\\/")
}

/// Standalone Leaflet page showing the map's current markers.
pub fn render_html(map: &MapView) -> Result<Vec<u8>, serde_json::Error> {
    let markers = serde_json::to_string(map.markers())?;
    let markers = json_for_script_tag(&markers);
    let center = map.center();
    let zoom = map.zoom();
    let count = map.markers().len();
    let tile_url = json_for_script_tag(&serde_json::to_string(TILE_URL)?);
    let attribution = json_for_script_tag(&serde_json::to_string(TILE_ATTRIBUTION)?);

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>Employee Map</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <style>
    html, body {{
      height: 100%;
      margin: 0;
      font-family: 'Arial', sans-serif;
    }}
    #map {{
      height: 100%;
      width: 100%;
    }}
    #badge {{
      position: absolute;
      top: 10px;
      left: 54px;
      z-index: 1000;
      padding: 8px 12px;
      background-color: #007BFF;
      color: #fff;
      border-radius: 4px;
      font-size: 14px;
    }}
  </style>
</head>
<body>
  <div id="badge">{count} employees on map</div>
  <div id="map"></div>
  <script type="application/json" id="markers-data">{markers}</script>
  <script>
    (function() {{
      const markers = JSON.parse(document.getElementById('markers-data').textContent || '[]');
      const map = L.map('map').setView([{lat}, {lng}], {zoom});
      L.tileLayer({tile_url}, {{ attribution: {attribution} }}).addTo(map);
      for (const m of markers) {{
        L.marker([m.position.lat, m.position.lng]).addTo(map).bindPopup(m.popup);
      }}
    }})();
  </script>
</body>
</html>
"####,
        lat = center.lat,
        lng = center.lng,
    );

    Ok(html.into_bytes())
}

//! `aoistudio basemaps`: list the basemap catalogue.

use std::path::Path;

use aoistudio::basemap::BasemapId;

use crate::config_file::ConfigFile;
use crate::error::CliError;

/// Print every basemap, marking the configured default.
pub fn run(config_path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(config_path).unwrap_or_default();

    println!("{}", render(config.map.basemap));
    Ok(())
}

fn render(default: BasemapId) -> String {
    let mut lines = vec![format!("{:<3}{:<7}{:<14}{:<9}TEMPLATE", "", "KEY", "NAME", "MAX ZOOM")];
    for id in BasemapId::ALL {
        let source = id.tile_source();
        let marker = if id == default { "*" } else { "" };
        lines.push(format!(
            "{:<3}{:<7}{:<14}{:<9}{}",
            marker,
            id.key(),
            id.display_name(),
            source.max_zoom(),
            source.url_template()
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_marks_default() {
        let table = render(BasemapId::Dark);
        let dark = table.lines().find(|l| l.contains("dark_all")).unwrap();

        assert!(dark.starts_with('*'));
        assert_eq!(table.lines().count(), 5);
        assert_eq!(table.matches('*').count(), 1);
    }
}

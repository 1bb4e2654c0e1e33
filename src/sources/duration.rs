/// Convierte una duración ISO-8601 (`PT3M5S`) a segundos.
///
/// Función pura y aislada: cada proveedor trae sus propias mañas de formato
/// y conviene poder cambiar el parser sin tocar la reproducción. Entradas
/// malformadas devuelven 0 (duración desconocida), nunca un error.
pub fn parse_iso8601_secs(duration: &str) -> u64 {
    let mut seconds: u64 = 0;
    let mut number = String::new();

    for c in duration.chars() {
        match c {
            '0'..='9' => number.push(c),
            'H' => {
                seconds += number.parse::<u64>().unwrap_or(0) * 3600;
                number.clear();
            }
            'M' => {
                seconds += number.parse::<u64>().unwrap_or(0) * 60;
                number.clear();
            }
            'S' => {
                seconds += number.parse::<u64>().unwrap_or(0);
                number.clear();
            }
            // Prefijos P/T y cualquier otro caracter no aportan valor.
            _ => number.clear(),
        }
    }

    seconds
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_minutes_and_seconds() {
        assert_eq!(parse_iso8601_secs("PT3M5S"), 185);
    }

    #[test]
    fn test_hours() {
        assert_eq!(parse_iso8601_secs("PT1H2M5S"), 3725);
    }

    #[test]
    fn test_seconds_only() {
        assert_eq!(parse_iso8601_secs("PT45S"), 45);
    }

    #[test]
    fn test_empty_and_garbage() {
        assert_eq!(parse_iso8601_secs(""), 0);
        assert_eq!(parse_iso8601_secs("no es una duración"), 0);
        assert_eq!(parse_iso8601_secs("P0D"), 0);
    }

    #[test]
    fn test_live_marker() {
        // Los vivos no traen duración; queda como desconocida.
        assert_eq!(parse_iso8601_secs("PT0S"), 0);
    }
}

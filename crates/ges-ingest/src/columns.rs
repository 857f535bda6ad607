//! Column alias resolution.
//!
//! Each input feed has been exported by several systems over time, so every
//! logical field is located through an ordered alias list. Matching is
//! case-, accent- and whitespace-insensitive.

use ges_model::CaseInsensitiveSet;

use crate::csv_table::CsvTable;
use crate::error::{IngestError, Result};

/// A logical field and the header spellings it may appear under.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
}

impl ColumnSpec {
    pub const fn new(field: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { field, aliases }
    }
}

pub mod population {
    use super::ColumnSpec;

    pub const ID: ColumnSpec = ColumnSpec::new("RUT", &["RUT", "RUN", "RUT_PACIENTE", "RUTPaciente"]);
    pub const CHECK: ColumnSpec = ColumnSpec::new("DV", &["DV", "DIGITO", "DV_PACIENTE", "DVPaciente"]);
    pub const CONDITION: ColumnSpec =
        ColumnSpec::new("Ges", &["Ges", "Patologia", "PATOLOGIA_GES", "Condicion GES"]);
}

pub mod progression {
    use super::ColumnSpec;

    pub const ID: ColumnSpec = ColumnSpec::new("RUT", &["RUT", "RUN"]);
    pub const VALUE: ColumnSpec = ColumnSpec::new("condicion", &["condicion", "Tipo"]);
}

pub mod severity {
    use super::ColumnSpec;

    pub const ID: ColumnSpec = ColumnSpec::new("RUT", &["RUT", "RUN"]);
    pub const VALUE: ColumnSpec = ColumnSpec::new("Severidad", &["Severidad", "Severity"]);
}

pub mod visits {
    use super::ColumnSpec;

    pub const COMBINED_ID: ColumnSpec = ColumnSpec::new("RUNPaciente", &["RUNPaciente", "RUN"]);
    pub const BODY: ColumnSpec = ColumnSpec::new("RutPaciente", &["RutPaciente", "RUT"]);
    pub const CHECK: ColumnSpec = ColumnSpec::new("DVPaciente", &["DVPaciente", "DV"]);
    pub const DATE: ColumnSpec = ColumnSpec::new("FechaCita", &["FechaCita", "Fecha Cita"]);
    pub const SPECIALTY_CODE: ColumnSpec =
        ColumnSpec::new("EspecialidadLocal", &["EspecialidadLocal", "Especialidad Local"]);
    pub const SPECIALTY_DESC: ColumnSpec = ColumnSpec::new(
        "EspecialidadLocal_Desc",
        &["EspecialidadLocal_Desc", "Especialidad_Desc", "Especialidad"],
    );
    pub const STATE: ColumnSpec =
        ColumnSpec::new("EstadoCita_Desc", &["EstadoCita_Desc", "EstadoCita", "Estado"]);
}

pub mod dispensations {
    use super::ColumnSpec;

    pub const BODY: ColumnSpec = ColumnSpec::new("RutPaciente", &["RutPaciente"]);
    pub const CHECK: ColumnSpec = ColumnSpec::new("DVPaciente", &["DVPaciente", "DV"]);
    pub const DATE: ColumnSpec = ColumnSpec::new("FechaDespacho", &["FechaDespacho"]);
    pub const DRUG: ColumnSpec = ColumnSpec::new("Farmaco_Desc", &["Farmaco_Desc", "Farmaco"]);
    pub const QUANTITY: ColumnSpec =
        ColumnSpec::new("CantidadDespachada", &["CantidadDespachada"]);
    pub const LOCATION: ColumnSpec = ColumnSpec::new("LocalSolicitante", &["LocalSolicitante"]);
}

pub mod prescriptions {
    use super::ColumnSpec;

    pub const BODY: ColumnSpec =
        ColumnSpec::new("RutPaciente", &["RutPaciente", "RUT PACIENTE", "RUT"]);
    pub const CHECK: ColumnSpec = ColumnSpec::new(
        "DVPaciente",
        &["DVPaciente", "DIGITO PACIENTE", "DIGITO", "DV"],
    );
    pub const DATE: ColumnSpec =
        ColumnSpec::new("FechaEmision", &["FechaEmision", "FECHA EMISION", "FECHA"]);
    pub const DRUG: ColumnSpec = ColumnSpec::new(
        "Farmaco_Desc",
        &[
            "Farmaco_Desc",
            "NOMBRE MEDICAMENTO",
            "MEDICAMENTO",
            "MEDICAMENTOS",
            "NOMBRE MEDICINA",
        ],
    );
    pub const QUANTITY: ColumnSpec = ColumnSpec::new(
        "CantidadDespachada",
        &["CantidadDespachada", "CANT.", "CANT", "CANTIDAD"],
    );
    pub const LOCATION: ColumnSpec =
        ColumnSpec::new("LocalSolicitante", &["LocalSolicitante", "POLICLINICO"]);
}

/// Header index for one table, with the table name kept for error messages.
pub struct ColumnResolver<'a> {
    table_name: &'a str,
    headers: &'a [String],
    lookup: CaseInsensitiveSet,
}

impl<'a> ColumnResolver<'a> {
    pub fn new(table_name: &'a str, table: &'a CsvTable) -> Self {
        Self {
            table_name,
            headers: &table.headers,
            lookup: CaseInsensitiveSet::new(&table.headers),
        }
    }

    pub fn optional(&self, spec: ColumnSpec) -> Option<usize> {
        self.lookup.position_of_any(spec.aliases)
    }

    pub fn required(&self, spec: ColumnSpec) -> Result<usize> {
        self.optional(spec)
            .ok_or_else(|| IngestError::MissingColumn {
                table: self.table_name.to_string(),
                column: spec.field,
                available: self.headers.join(", "),
            })
    }
}

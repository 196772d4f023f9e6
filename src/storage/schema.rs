//! Database schema definitions

/// Name of the appointment table
pub const APPOINTMENTS_TABLE: &str = "consultas";

/// SQL to create the appointment table
pub const CREATE_APPOINTMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS consultas (
    id_consulta INTEGER PRIMARY KEY AUTOINCREMENT,
    id_paciente INTEGER,
    id_medico INTEGER,
    data_consulta TEXT,
    estado TEXT,
    cidade TEXT,
    especialidade TEXT,
    idade_paciente INTEGER,
    sexo_paciente TEXT,
    valor_consulta REAL,
    forma_pagamento TEXT,
    tempo_espera_min INTEGER,
    satisfacao_paciente REAL,
    receita_medicacao TEXT,
    status_consulta TEXT
)
"#;

/// Non-key columns, in the order every statement binds them
pub const FIELD_COLUMNS: [&str; 14] = [
    "id_paciente",
    "id_medico",
    "data_consulta",
    "estado",
    "cidade",
    "especialidade",
    "idade_paciente",
    "sexo_paciente",
    "valor_consulta",
    "forma_pagamento",
    "tempo_espera_min",
    "satisfacao_paciente",
    "receita_medicacao",
    "status_consulta",
];

pub const SELECT_APPOINTMENTS: &str = r#"
SELECT id_consulta, id_paciente, id_medico, data_consulta, estado, cidade,
       especialidade, idade_paciente, sexo_paciente, valor_consulta,
       forma_pagamento, tempo_espera_min, satisfacao_paciente,
       receita_medicacao, status_consulta
FROM consultas
"#;

pub const INSERT_APPOINTMENT: &str = r#"
INSERT INTO consultas (
    id_paciente, id_medico, data_consulta, estado, cidade,
    especialidade, idade_paciente, sexo_paciente, valor_consulta,
    forma_pagamento, tempo_espera_min, satisfacao_paciente,
    receita_medicacao, status_consulta
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
"#;

pub const UPDATE_APPOINTMENT: &str = r#"
UPDATE consultas SET
    id_paciente = ?1, id_medico = ?2, data_consulta = ?3, estado = ?4, cidade = ?5,
    especialidade = ?6, idade_paciente = ?7, sexo_paciente = ?8, valor_consulta = ?9,
    forma_pagamento = ?10, tempo_espera_min = ?11, satisfacao_paciente = ?12,
    receita_medicacao = ?13, status_consulta = ?14
WHERE id_consulta = ?15
"#;

pub const DELETE_APPOINTMENT: &str = "DELETE FROM consultas WHERE id_consulta = ?1";

pub const COUNT_APPOINTMENTS: &str = "SELECT COUNT(*) FROM consultas";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![CREATE_APPOINTMENTS_TABLE]
}

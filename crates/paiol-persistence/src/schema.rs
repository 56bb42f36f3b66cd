//! Esquema Diesel (declarado manualmente). Reemplazable con `diesel print-schema`.

diesel::table! {
    paiois (id) {
        id -> Uuid,
        nome -> Text,
        localizacao -> Text,
        status -> Text,
        ciclo_atual -> Int4,
        criado_em -> Timestamptz,
        ativo -> Bool,
    }
}

diesel::table! {
    transicoes_status (id) {
        id -> Uuid,
        paiol_id -> Uuid,
        status_anterior -> Nullable<Text>,
        status_novo -> Text,
        data -> Timestamptz,
        observacoes -> Nullable<Text>,
    }
}

diesel::table! {
    dragagens (id) {
        id -> Uuid,
        paiol_id -> Uuid,
        dragador_id -> Uuid,
        ajudante_id -> Nullable<Uuid>,
        data_inicio -> Timestamptz,
        data_fim -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    cubagens (id) {
        id -> Uuid,
        dragagem_id -> Uuid,
        medida_inferior -> Float8,
        medida_superior -> Float8,
        perimetro -> Float8,
        volume_normal -> Float8,
        volume_reduzido -> Float8,
        data_medicao -> Timestamptz,
    }
}

diesel::table! {
    retiradas (id) {
        id -> Uuid,
        paiol_id -> Uuid,
        cliente_id -> Uuid,
        volume_retirado -> Float8,
        valor_unitario -> Nullable<Float8>,
        valor_total -> Nullable<Float8>,
        status_pagamento -> Text,
        tem_frete -> Bool,
        data_retirada -> Timestamptz,
    }
}

diesel::table! {
    fechamentos (id) {
        id -> Uuid,
        paiol_id -> Uuid,
        data_fechamento -> Timestamptz,
    }
}

diesel::table! {
    pagamentos_pessoal (id) {
        id -> Uuid,
        dragagem_id -> Uuid,
        tipo_pessoa -> Text,
        pessoa_id -> Uuid,
        tipo_pagamento -> Text,
        valor -> Float8,
        data_pagamento -> Timestamptz,
    }
}

diesel::table! {
    gastos_insumo (id) {
        id -> Uuid,
        dragagem_id -> Uuid,
        tipo_insumo -> Text,
        categoria -> Text,
        quantidade -> Float8,
        unidade -> Text,
        valor_unitario -> Float8,
        valor_total -> Float8,
        data_gasto -> Timestamptz,
    }
}

diesel::table! {
    dragadores (id) {
        id -> Uuid,
        nome -> Text,
        ativo -> Bool,
    }
}

diesel::table! {
    ajudantes (id) {
        id -> Uuid,
        nome -> Text,
        ativo -> Bool,
    }
}

diesel::table! {
    clientes (id) {
        id -> Uuid,
        nome -> Text,
        ativo -> Bool,
    }
}

diesel::joinable!(transicoes_status -> paiois (paiol_id));
diesel::joinable!(dragagens -> paiois (paiol_id));
diesel::joinable!(cubagens -> dragagens (dragagem_id));
diesel::joinable!(retiradas -> paiois (paiol_id));
diesel::joinable!(retiradas -> clientes (cliente_id));
diesel::joinable!(fechamentos -> paiois (paiol_id));
diesel::joinable!(pagamentos_pessoal -> dragagens (dragagem_id));
diesel::joinable!(gastos_insumo -> dragagens (dragagem_id));

diesel::allow_tables_to_appear_in_same_query!(
    paiois,
    transicoes_status,
    dragagens,
    cubagens,
    retiradas,
    fechamentos,
    pagamentos_pessoal,
    gastos_insumo,
    dragadores,
    ajudantes,
    clientes,
);
